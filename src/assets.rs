use indexmap::IndexSet;
use std::collections::HashMap;
use std::fmt;

/// Asset table kinds probed for numeric cross-references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Sprite,
    Room,
    GameObject,
    Background,
    Script,
    Path,
}

impl AssetKind {
    /// Fixed probe order for ambiguous numeric literals
    pub const PROBE_ORDER: [AssetKind; 6] = [
        AssetKind::Sprite,
        AssetKind::Room,
        AssetKind::GameObject,
        AssetKind::Background,
        AssetKind::Script,
        AssetKind::Path,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Sprite => "sprite",
            AssetKind::Room => "room",
            AssetKind::GameObject => "object",
            AssetKind::Background => "background",
            AssetKind::Script => "script",
            AssetKind::Path => "path",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A typed pointer-by-key into the game's tables; never owns its target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// An instruction address within the current code unit
    Instruction(u32),
    /// An entry in one of the indexed asset tables
    Asset(AssetKind, usize),
    /// A function known to the function table, by name
    Function(String),
    /// An entry in the string table
    StringEntry(usize),
    /// A variable's defining entity, by name
    Variable(String),
}

/// What a reference designates, borrowed from the directory
#[derive(Debug, Clone, PartialEq)]
pub enum NavTarget<'a> {
    Asset {
        kind: AssetKind,
        index: usize,
        name: &'a str,
    },
    Function {
        name: &'a str,
    },
    StringEntry {
        index: usize,
        text: &'a str,
    },
    Instruction {
        address: u32,
    },
    Variable {
        name: &'a str,
    },
}

/// Identity handle for one compiled script or event
///
/// The revision changes whenever the underlying code changes, so cached
/// views of an older revision stop being current.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeUnit {
    pub name: String,
    pub revision: u64,
}

impl CodeUnit {
    pub fn new(name: &str) -> Self {
        CodeUnit {
            name: name.to_string(),
            revision: 0,
        }
    }
}

impl fmt::Display for CodeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Read-only directory of the game's addressable entities
///
/// Loaded elsewhere; this crate only queries it by index or name.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    pub sprites: Vec<String>,
    pub rooms: Vec<String>,
    pub game_objects: Vec<String>,
    pub backgrounds: Vec<String>,
    pub scripts: Vec<String>,
    pub paths: Vec<String>,
    /// String table, indexed by string id
    pub strings: Vec<String>,
    /// Known function names, in table order
    pub functions: IndexSet<String>,
    /// Code units by name
    pub code: HashMap<String, CodeUnit>,
}

impl GameData {
    pub fn table(&self, kind: AssetKind) -> &[String] {
        match kind {
            AssetKind::Sprite => &self.sprites,
            AssetKind::Room => &self.rooms,
            AssetKind::GameObject => &self.game_objects,
            AssetKind::Background => &self.backgrounds,
            AssetKind::Script => &self.scripts,
            AssetKind::Path => &self.paths,
        }
    }

    pub fn asset_name(&self, kind: AssetKind, index: usize) -> Option<&str> {
        self.table(kind).get(index).map(String::as_str)
    }

    pub fn string(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }

    pub fn code_by_name(&self, name: &str) -> Option<&CodeUnit> {
        self.code.get(name)
    }

    /// Resolve a reference to the entity it designates
    ///
    /// Out-of-range indices and unknown names resolve to `None` rather
    /// than an error.
    pub fn resolve<'a>(&'a self, reference: &'a Reference) -> Option<NavTarget<'a>> {
        match reference {
            Reference::Instruction(address) => Some(NavTarget::Instruction { address: *address }),
            Reference::Asset(kind, index) => {
                self.asset_name(*kind, *index).map(|name| NavTarget::Asset {
                    kind: *kind,
                    index: *index,
                    name,
                })
            }
            Reference::Function(name) => {
                self.functions.get(name.as_str()).map(|name| NavTarget::Function {
                    name: name.as_str(),
                })
            }
            Reference::StringEntry(index) => self.string(*index).map(|text| NavTarget::StringEntry {
                index: *index,
                text,
            }),
            Reference::Variable(name) => Some(NavTarget::Variable { name }),
        }
    }

    /// Display name for a resolved reference, used in trailing comments
    pub fn describe(&self, reference: &Reference) -> Option<String> {
        match self.resolve(reference)? {
            NavTarget::Asset { name, .. } => Some(name.to_string()),
            NavTarget::Function { name } => Some(name.to_string()),
            NavTarget::StringEntry { text, .. } => Some(format!("\"{}\"", text)),
            NavTarget::Instruction { address } => Some(format!("{:05}", address)),
            NavTarget::Variable { name } => Some(name.to_string()),
        }
    }
}
