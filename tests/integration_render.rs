//! End-to-end tests for the view pipeline
//!
//! These drive the public API the way a presentation layer would: a
//! mock backend stands in for the external decoder/decompiler, a
//! RenderSession offloads the work, and the results are read back after
//! the hand-back. The tests cover:
//! - span-classified disassembly through the background split
//! - the per-representation cache suppressing redundant requests
//! - captured backend failures surfacing as rendered error blocks
//! - the localization table side effect of decompiling
//! - the oversized-unit raw fast path

use gmview::assets::{CodeUnit, GameData, Reference};
use gmview::backend::{Backend, BackendError};
use gmview::classifier::DecompiledView;
use gmview::formatter::{DisassemblyView, StyleClass, MAX_HIGHLIGHT_INSTRUCTIONS};
use gmview::gettext::{GETTEXT, GETTEXT_SOURCE_SCRIPT};
use gmview::instruction::{DataType, Instruction, Opcode, PushValue};
use gmview::view::{disassembly_view, RenderSession, ViewContent, ViewKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use test_log::test;

#[derive(Default)]
struct UnitSource {
    instructions: Vec<Instruction>,
    disassembly: String,
    decompiled: String,
    dot: String,
}

/// Stands in for the external decoder/decompiler
#[derive(Default)]
struct MockBackend {
    units: HashMap<String, UnitSource>,
}

impl MockBackend {
    fn insert(&mut self, name: &str, source: UnitSource) {
        self.units.insert(name.to_string(), source);
    }

    fn get(&self, unit: &CodeUnit) -> Result<&UnitSource, BackendError> {
        self.units
            .get(&unit.name)
            .ok_or_else(|| BackendError::MissingUnit(unit.name.clone()))
    }
}

impl Backend for MockBackend {
    fn decode(&self, unit: &CodeUnit) -> Result<Vec<Instruction>, BackendError> {
        Ok(self.get(unit)?.instructions.clone())
    }

    fn disassemble(&self, unit: &CodeUnit) -> Result<String, BackendError> {
        Ok(self.get(unit)?.disassembly.clone())
    }

    fn decompile(&self, unit: &CodeUnit) -> Result<String, BackendError> {
        Ok(self.get(unit)?.decompiled.clone())
    }

    fn flow_graph(&self, unit: &CodeUnit) -> Result<String, BackendError> {
        Ok(self.get(unit)?.dot.clone())
    }
}

fn push_int(address: u32, value: i32) -> Instruction {
    Instruction {
        type1: Some(DataType::Int32),
        value: Some(PushValue::Int32(value)),
        ..Instruction::new(address, Opcode::Push)
    }
}

fn wait(session: &mut RenderSession) {
    assert!(
        session.wait_idle(Duration::from_secs(10)),
        "background work did not finish"
    );
}

#[test]
fn test_disassembly_end_to_end() {
    let mut backend = MockBackend::default();
    backend.insert(
        "gml_Script_attack",
        UnitSource {
            instructions: vec![push_int(0, 5), Instruction::new(1, Opcode::Ret)],
            ..UnitSource::default()
        },
    );

    let mut session = RenderSession::new(Arc::new(GameData::default()), Arc::new(backend));
    let unit = CodeUnit::new("gml_Script_attack");

    assert!(session.request(&unit, ViewKind::Disassembly));
    wait(&mut session);

    let content = session.views().get(ViewKind::Disassembly).expect("no view");
    let ViewContent::Disassembly(DisassemblyView::Lines(lines)) = content else {
        panic!("expected classified disassembly, got {:?}", content);
    };
    assert_eq!(lines.len(), 2);
    let first: Vec<&str> = lines[0].iter().map(|s| s.text.as_str()).collect();
    assert_eq!(first, vec!["00000: ", "push", ".i", " ", "5"]);
    // a plain pushed literal is not a cross-reference
    assert_eq!(lines[0].last().unwrap().target, None);
}

#[test]
fn test_cached_unit_is_a_no_op() {
    let mut backend = MockBackend::default();
    backend.insert(
        "gml_Script_idle",
        UnitSource {
            instructions: vec![Instruction::new(0, Opcode::Exit)],
            ..UnitSource::default()
        },
    );

    let mut session = RenderSession::new(Arc::new(GameData::default()), Arc::new(backend));
    let unit = CodeUnit::new("gml_Script_idle");

    assert!(session.request(&unit, ViewKind::Disassembly));
    wait(&mut session);
    // already current, nothing to do
    assert!(!session.request(&unit, ViewKind::Disassembly));

    // a new revision of the same unit is stale and recomputes
    let mut newer = unit.clone();
    newer.revision = 1;
    assert!(session.request(&newer, ViewKind::Disassembly));
    wait(&mut session);
}

#[test]
fn test_backend_failure_becomes_error_block() {
    let backend = MockBackend::default();
    let mut session = RenderSession::new(Arc::new(GameData::default()), Arc::new(backend));
    let unit = CodeUnit::new("gml_Script_missing");

    assert!(session.request(&unit, ViewKind::Decompiled));
    wait(&mut session);

    let content = session.views().get(ViewKind::Decompiled).expect("no view");
    let ViewContent::Failed(block) = content else {
        panic!("expected an error block, got {:?}", content);
    };
    assert_eq!(block[0].text, "EXCEPTION!\n");
    assert_eq!(block[0].style, StyleClass::Error);
    assert!(block[1].text.contains("gml_Script_missing"));

    // the failure is remembered for this unit, not retried on revisit
    assert!(!session.request(&unit, ViewKind::Decompiled));
}

#[test]
fn test_decompiled_builds_localization_table() {
    let mut backend = MockBackend::default();
    backend.insert(
        GETTEXT_SOURCE_SCRIPT,
        UnitSource {
            decompiled: "ds_map_add(global.text_data_en, \"greeting\"@3, \"hello\"@42)\n"
                .to_string(),
            ..UnitSource::default()
        },
    );
    backend.insert(
        "gml_Script_talk",
        UnitSource {
            decompiled: "t = scr_gettext(\"greeting\"@3)\r\nreturn t".to_string(),
            ..UnitSource::default()
        },
    );

    let mut data = GameData::default();
    data.strings = (0..50).map(|i| format!("string {}", i)).collect();
    data.functions.insert("scr_gettext".to_string());
    data.code.insert(
        GETTEXT_SOURCE_SCRIPT.to_string(),
        CodeUnit::new(GETTEXT_SOURCE_SCRIPT),
    );

    // the table is process-wide; start this test from a clean slate
    GETTEXT.invalidate();

    let mut session = RenderSession::new(Arc::new(data), Arc::new(backend));
    let unit = CodeUnit::new("gml_Script_talk");

    assert!(session.request(&unit, ViewKind::Decompiled));
    wait(&mut session);

    assert!(GETTEXT.is_built());
    assert_eq!(GETTEXT.table().unwrap().get("greeting"), Some(42));

    let content = session.views().get(ViewKind::Decompiled).expect("no view");
    let ViewContent::Decompiled(DecompiledView::Classified(lines)) = content else {
        panic!("expected classified lines, got {:?}", content);
    };
    // carriage returns are normalized away
    assert_eq!(lines.len(), 2);
    let annotations = &lines[0].annotations;
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].key, "greeting");
    assert_eq!(annotations[0].display, "\"string 42\"");
    assert_eq!(annotations[0].target, Reference::StringEntry(42));
}

#[test]
fn test_oversized_unit_takes_raw_path() {
    let count = MAX_HIGHLIGHT_INSTRUCTIONS + 1;
    let raw = "push.i 5\n".repeat(count);
    let mut backend = MockBackend::default();
    backend.insert(
        "gml_Script_huge",
        UnitSource {
            instructions: (0..count as u32).map(|a| push_int(a, 5)).collect(),
            disassembly: raw.clone(),
            ..UnitSource::default()
        },
    );

    let unit = CodeUnit::new("gml_Script_huge");
    let view = disassembly_view(&unit, &backend).expect("view failed");
    match view {
        DisassemblyView::Raw(text) => assert_eq!(text, raw),
        DisassemblyView::Lines(_) => panic!("expected the raw fast path"),
    }
}

#[test]
fn test_graph_view_hands_back_dot_text() {
    let mut backend = MockBackend::default();
    backend.insert(
        "gml_Script_branchy",
        UnitSource {
            dot: "digraph G { b0 -> b1 }".to_string(),
            ..UnitSource::default()
        },
    );

    let mut session = RenderSession::new(Arc::new(GameData::default()), Arc::new(backend));
    let unit = CodeUnit::new("gml_Script_branchy");

    assert!(session.request(&unit, ViewKind::Graph));
    wait(&mut session);

    let content = session.views().get(ViewKind::Graph).expect("no view");
    assert_eq!(
        content,
        &ViewContent::Graph("digraph G { b0 -> b1 }".to_string())
    );
}
