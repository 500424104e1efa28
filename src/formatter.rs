use crate::assets::Reference;
use crate::instruction::{DataType, Instruction, InstructionCategory, Opcode};

/// Above this instruction count, span classification is skipped and the
/// backend's pre-serialized disassembly is shown instead. Classifying a
/// very large unit can take minutes.
pub const MAX_HIGHLIGHT_INSTRUCTIONS: usize = 5000;

/// Style categories the presentation layer maps to colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleClass {
    Address,
    Mnemonic,
    Type,
    Operand,
    Comment,
    Error,
    /// Unstyled filler: spacing, scaffolding, raw fast-path text
    Default,
}

/// One labeled run of text, optionally navigable
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedSpan {
    pub text: String,
    pub style: StyleClass,
    pub target: Option<Reference>,
}

impl FormattedSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        FormattedSpan {
            text: text.into(),
            style: StyleClass::Default,
            target: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: StyleClass) -> Self {
        FormattedSpan {
            text: text.into(),
            style,
            target: None,
        }
    }

    pub fn linked(text: impl Into<String>, style: StyleClass, target: Reference) -> Self {
        FormattedSpan {
            text: text.into(),
            style,
            target: Some(target),
        }
    }
}

/// A rendered disassembly, either fully classified or raw text for
/// oversized units
#[derive(Debug, Clone, PartialEq)]
pub enum DisassemblyView {
    Lines(Vec<Vec<FormattedSpan>>),
    Raw(String),
}

/// Format one decoded instruction as an ordered span sequence
///
/// Dispatch is by operand shape. Shapes outside the known set degrade to
/// address and mnemonic only.
pub fn format_instruction(instr: &Instruction) -> Vec<FormattedSpan> {
    let mut spans = vec![
        FormattedSpan::styled(format!("{:05}: ", instr.address), StyleClass::Address),
        FormattedSpan::styled(instr.opcode.mnemonic(), StyleClass::Mnemonic),
    ];

    match instr.category() {
        InstructionCategory::SingleType => {
            push_type(&mut spans, instr.type1);
            spans.push(FormattedSpan::plain(" "));
            if instr.opcode == Opcode::Dup {
                spans.push(FormattedSpan::plain(" "));
                spans.push(FormattedSpan::styled(
                    instr.dup_extra.to_string(),
                    StyleClass::Operand,
                ));
            }
        }
        InstructionCategory::DoubleType => {
            push_type(&mut spans, instr.type1);
            push_type(&mut spans, instr.type2);
            spans.push(FormattedSpan::plain(" "));
        }
        InstructionCategory::Comparison => {
            push_type(&mut spans, instr.type1);
            push_type(&mut spans, instr.type2);
            spans.push(FormattedSpan::plain(" "));
            if let Some(comparison) = instr.comparison {
                spans.push(FormattedSpan::styled(comparison.name(), StyleClass::Mnemonic));
            }
        }
        InstructionCategory::Goto => {
            spans.push(FormattedSpan::plain(" "));
            // displayed relative with an explicit sign; the target is the
            // absolute destination
            let offset = if instr.jump_offset == 0 {
                "$0".to_string()
            } else {
                format!("${:+}", instr.jump_offset)
            };
            spans.push(FormattedSpan::linked(
                offset,
                StyleClass::Operand,
                Reference::Instruction(instr.jump_target()),
            ));
        }
        InstructionCategory::Pop => {
            push_type(&mut spans, instr.type1);
            push_type(&mut spans, instr.type2);
            spans.push(FormattedSpan::plain(" "));
            if let Some(dest) = &instr.destination {
                spans.push(FormattedSpan::linked(
                    dest.to_string(),
                    StyleClass::Operand,
                    Reference::Variable(dest.name.clone()),
                ));
            }
        }
        InstructionCategory::Push => {
            push_type(&mut spans, instr.type1);
            spans.push(FormattedSpan::plain(" "));
            if let Some(value) = &instr.value {
                spans.push(FormattedSpan {
                    text: value.to_string(),
                    style: StyleClass::Operand,
                    target: value.target(),
                });
            }
        }
        InstructionCategory::Call => {
            push_type(&mut spans, instr.type1);
            spans.push(FormattedSpan::plain(" "));
            if let Some(function) = &instr.function {
                spans.push(FormattedSpan::linked(
                    function.name.clone(),
                    StyleClass::Operand,
                    Reference::Function(function.name.clone()),
                ));
                spans.push(FormattedSpan::plain("(argc="));
                spans.push(FormattedSpan::styled(
                    function.argc.to_string(),
                    StyleClass::Operand,
                ));
                spans.push(FormattedSpan::plain(")"));
            }
        }
        InstructionCategory::Break => {
            push_type(&mut spans, instr.type1);
            spans.push(FormattedSpan::plain(" "));
            spans.push(FormattedSpan::styled(
                instr.break_value.to_string(),
                StyleClass::Operand,
            ));
        }
        InstructionCategory::Other => {}
    }

    spans
}

fn push_type(spans: &mut Vec<FormattedSpan>, tag: Option<DataType>) {
    if let Some(tag) = tag {
        spans.push(FormattedSpan::styled(
            format!(".{}", tag.suffix()),
            StyleClass::Type,
        ));
    }
}

/// Format a full instruction sequence, one span vector per line
pub fn disassembly_lines(instructions: &[Instruction]) -> Vec<Vec<FormattedSpan>> {
    instructions.iter().map(format_instruction).collect()
}
