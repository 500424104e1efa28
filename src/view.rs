use crate::assets::{CodeUnit, GameData};
use crate::backend::{Backend, BackendError};
use crate::classifier::{classify_text, ClassifyEnv, DecompiledView};
use crate::formatter::{
    disassembly_lines, DisassemblyView, FormattedSpan, StyleClass, MAX_HIGHLIGHT_INSTRUCTIONS,
};
use crate::gettext::{GETTEXT, GETTEXT_SOURCE_SCRIPT};
use log::{debug, warn};
use std::collections::HashSet;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// The three materializable representations of a code unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Disassembly,
    Decompiled,
    Graph,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Disassembly => write!(f, "disassembly"),
            ViewKind::Decompiled => write!(f, "decompiled"),
            ViewKind::Graph => write!(f, "graph"),
        }
    }
}

/// Finished content for one representation
#[derive(Debug, Clone, PartialEq)]
pub enum ViewContent {
    Disassembly(DisassemblyView),
    Decompiled(DecompiledView),
    /// Flow-graph description text for the external layout engine
    Graph(String),
    /// A captured backend failure, rendered instead of the view
    Failed(Vec<FormattedSpan>),
}

/// Build the disassembly representation of a code unit
///
/// Units above the instruction threshold skip span classification and
/// show the backend's pre-serialized text instead.
pub fn disassembly_view(
    unit: &CodeUnit,
    backend: &dyn Backend,
) -> Result<DisassemblyView, BackendError> {
    let instructions = backend.decode(unit)?;
    if instructions.len() > MAX_HIGHLIGHT_INSTRUCTIONS {
        debug!(
            "{}: {} instructions, skipping span classification",
            unit,
            instructions.len()
        );
        return Ok(DisassemblyView::Raw(backend.disassemble(unit)?));
    }
    Ok(DisassemblyView::Lines(disassembly_lines(&instructions)))
}

/// Build the classified decompilation of a code unit
///
/// Builds the process-wide localization table first if it has not been
/// built yet and the textdata script exists. A textdata script that
/// fails to decompile still publishes (an empty) table; an absent one
/// leaves the cache unbuilt.
pub fn decompiled_view(
    unit: &CodeUnit,
    data: &GameData,
    backend: &dyn Backend,
) -> Result<DecompiledView, BackendError> {
    let text = backend.decompile(unit)?.replace("\r\n", "\n");

    GETTEXT.ensure_built(|| {
        let source = data.code_by_name(GETTEXT_SOURCE_SCRIPT)?;
        match backend.decompile(source) {
            Ok(text) => Some(text.replace("\r\n", "\n")),
            Err(e) => {
                warn!("localization source failed to decompile: {}", e);
                Some(String::new())
            }
        }
    });

    let table = GETTEXT.table();
    let env = ClassifyEnv {
        data,
        gettext: table.as_ref(),
    };
    Ok(classify_text(&text, &env))
}

/// Build the flow-graph description of a code unit
pub fn graph_view(unit: &CodeUnit, backend: &dyn Backend) -> Result<String, BackendError> {
    backend.flow_graph(unit)
}

/// Rendered stand-in for a failed view
pub fn error_block(err: &BackendError) -> Vec<FormattedSpan> {
    vec![
        FormattedSpan::styled("EXCEPTION!\n", StyleClass::Error),
        FormattedSpan::styled(err.to_string(), StyleClass::Error),
    ]
}

/// Markers for which unit each representation currently shows
///
/// A request for a unit already marked current is redundant and is
/// dropped. Revision bumps make the old marker stale automatically.
#[derive(Debug, Default)]
pub struct ViewCache {
    disassembled: Option<CodeUnit>,
    decompiled: Option<CodeUnit>,
    graphed: Option<CodeUnit>,
}

impl ViewCache {
    fn slot(&self, kind: ViewKind) -> &Option<CodeUnit> {
        match kind {
            ViewKind::Disassembly => &self.disassembled,
            ViewKind::Decompiled => &self.decompiled,
            ViewKind::Graph => &self.graphed,
        }
    }

    fn slot_mut(&mut self, kind: ViewKind) -> &mut Option<CodeUnit> {
        match kind {
            ViewKind::Disassembly => &mut self.disassembled,
            ViewKind::Decompiled => &mut self.decompiled,
            ViewKind::Graph => &mut self.graphed,
        }
    }

    pub fn is_current(&self, kind: ViewKind, unit: &CodeUnit) -> bool {
        self.slot(kind).as_ref() == Some(unit)
    }

    pub fn mark(&mut self, kind: ViewKind, unit: CodeUnit) {
        *self.slot_mut(kind) = Some(unit);
    }

    pub fn clear(&mut self) {
        *self = ViewCache::default();
    }
}

/// Published view content, one slot per representation
#[derive(Debug, Default)]
pub struct ViewState {
    disassembly: Option<ViewContent>,
    decompiled: Option<ViewContent>,
    graph: Option<ViewContent>,
}

impl ViewState {
    pub fn get(&self, kind: ViewKind) -> Option<&ViewContent> {
        match kind {
            ViewKind::Disassembly => self.disassembly.as_ref(),
            ViewKind::Decompiled => self.decompiled.as_ref(),
            ViewKind::Graph => self.graph.as_ref(),
        }
    }

    fn set(&mut self, kind: ViewKind, content: ViewContent) {
        match kind {
            ViewKind::Disassembly => self.disassembly = Some(content),
            ViewKind::Decompiled => self.decompiled = Some(content),
            ViewKind::Graph => self.graph = Some(content),
        }
    }
}

struct ViewEvent {
    unit: CodeUnit,
    kind: ViewKind,
    content: ViewContent,
}

/// Offloads view computation to background threads
///
/// Each accepted request spawns one compute thread; the thread sends
/// exactly one event back and the requesting context publishes it by
/// calling `poll`, so all caller-visible mutation happens on that
/// context. Duplicate requests for a unit already current or already in
/// flight are dropped. There is no mid-flight cancellation; oversized
/// units are bounded by the fast paths instead.
pub struct RenderSession {
    data: Arc<GameData>,
    backend: Arc<dyn Backend + Send + Sync>,
    cache: ViewCache,
    in_flight: HashSet<(CodeUnit, ViewKind)>,
    tx: Sender<ViewEvent>,
    rx: Receiver<ViewEvent>,
    views: ViewState,
}

impl RenderSession {
    pub fn new(data: Arc<GameData>, backend: Arc<dyn Backend + Send + Sync>) -> Self {
        let (tx, rx) = mpsc::channel();
        RenderSession {
            data,
            backend,
            cache: ViewCache::default(),
            in_flight: HashSet::new(),
            tx,
            rx,
            views: ViewState::default(),
        }
    }

    /// Request one representation of a unit; returns whether a compute
    /// task was started
    pub fn request(&mut self, unit: &CodeUnit, kind: ViewKind) -> bool {
        if self.cache.is_current(kind, unit) {
            debug!("{} view of {} already current", kind, unit);
            return false;
        }
        if !self.in_flight.insert((unit.clone(), kind)) {
            debug!("{} view of {} already in flight", kind, unit);
            return false;
        }

        let tx = self.tx.clone();
        let data = Arc::clone(&self.data);
        let backend = Arc::clone(&self.backend);
        let unit = unit.clone();
        thread::spawn(move || {
            let content = compute_view(&unit, &data, backend.as_ref(), kind);
            // the session may be gone; nothing left to publish to
            let _ = tx.send(ViewEvent {
                unit,
                kind,
                content,
            });
        });
        true
    }

    /// Publish any finished work onto this context; returns how many
    /// views were published
    pub fn poll(&mut self) -> usize {
        let mut published = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.publish(event);
            published += 1;
        }
        published
    }

    /// Block until in-flight work drains or the timeout passes
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.in_flight.is_empty() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(event) => self.publish(event),
                Err(_) => return false,
            }
        }
        true
    }

    pub fn views(&self) -> &ViewState {
        &self.views
    }

    pub fn cache(&self) -> &ViewCache {
        &self.cache
    }

    /// Forget all cached markers, forcing recomputation on next request
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    fn publish(&mut self, event: ViewEvent) {
        self.in_flight.remove(&(event.unit.clone(), event.kind));
        self.cache.mark(event.kind, event.unit);
        self.views.set(event.kind, event.content);
    }
}

/// The background compute phase: pure, failures captured as content
fn compute_view(
    unit: &CodeUnit,
    data: &GameData,
    backend: &dyn Backend,
    kind: ViewKind,
) -> ViewContent {
    let result = match kind {
        ViewKind::Disassembly => disassembly_view(unit, backend).map(ViewContent::Disassembly),
        ViewKind::Decompiled => decompiled_view(unit, data, backend).map(ViewContent::Decompiled),
        ViewKind::Graph => graph_view(unit, backend).map(ViewContent::Graph),
    };
    result.unwrap_or_else(|e| {
        warn!("{} view of {} failed: {}", kind, unit, e);
        ViewContent::Failed(error_block(&e))
    })
}
