use super::ir::Segment;
use smol_str::SmolStr;
use std::{collections::BTreeMap, error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Declared type name, either a primitive or a class.
    pub ty: SmolStr,
    pub kind: SymbolKind,
    /// Slot within the symbol's kind, counting from zero.
    pub index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SymbolKind {
    Static,
    Field,
    Argument,
    Local,
}

impl SymbolKind {
    #[inline]
    pub fn scope(self) -> SymbolScope {
        match self {
            SymbolKind::Static | SymbolKind::Field => SymbolScope::Class,
            SymbolKind::Argument | SymbolKind::Local => SymbolScope::Subroutine,
        }
    }

    /// Memory segment where variables of this kind live.
    #[rustfmt::skip]
    pub fn segment(self) -> Segment {
        match self {
            SymbolKind::Static   => Segment::Static,
            SymbolKind::Field    => Segment::This,
            SymbolKind::Argument => Segment::Argument,
            SymbolKind::Local    => Segment::Local,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SymbolKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolKind::Static   => write!(f, "static"),
            SymbolKind::Field    => write!(f, "field"),
            SymbolKind::Argument => write!(f, "argument"),
            SymbolKind::Local    => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    /// Lives as long as the class is being compiled.
    Class,
    /// Cleared at the start of every subroutine.
    Subroutine,
}

/// Two level scope table.
///
/// Class level holds statics and fields, subroutine level
/// holds arguments and locals. Lookups try the subroutine
/// level first, so a local may shadow a field of the same name.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_name: SmolStr,
    class_symbols: BTreeMap<SmolStr, Symbol>,
    subroutine_symbols: BTreeMap<SmolStr, Symbol>,
    /// Next free index per kind.
    counts: [u16; 4],
}

impl SymbolTable {
    pub fn new(class_name: impl Into<SmolStr>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        self.class_name.as_str()
    }

    pub fn set_class_name(&mut self, class_name: impl Into<SmolStr>) {
        self.class_name = class_name.into();
    }

    /// Clear the subroutine level, resetting the argument and local counters.
    pub fn start_subroutine(&mut self) {
        self.subroutine_symbols.clear();
        self.counts[SymbolKind::Argument.slot()] = 0;
        self.counts[SymbolKind::Local.slot()] = 0;
    }

    /// Clear everything so the table can be reused for another class.
    pub fn reset(&mut self) {
        self.class_name = SmolStr::default();
        self.class_symbols.clear();
        self.subroutine_symbols.clear();
        self.counts = [0; 4];
    }

    /// Add a symbol to the scope level matching its kind, assigning
    /// the next free index of that kind.
    ///
    /// Defining a name twice within the same level is rejected.
    pub fn define(
        &mut self,
        name: impl Into<SmolStr>,
        ty: impl Into<SmolStr>,
        kind: SymbolKind,
    ) -> Result<u16, SymbolError> {
        let name = name.into();
        let symbols = match kind.scope() {
            SymbolScope::Class => &mut self.class_symbols,
            SymbolScope::Subroutine => &mut self.subroutine_symbols,
        };

        if let Some(existing) = symbols.get(&name) {
            return Err(SymbolError::Duplicate {
                name,
                existing: existing.kind,
            });
        }

        let count = &mut self.counts[kind.slot()];
        let index = *count;
        *count = count.checked_add(1).ok_or(SymbolError::Overflow { kind })?;

        symbols.insert(
            name.clone(),
            Symbol {
                name,
                ty: ty.into(),
                kind,
                index,
            },
        );

        Ok(index)
    }

    /// Resolve a name, trying the subroutine level before the class level.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_symbols
            .get(name)
            .or_else(|| self.class_symbols.get(name))
    }

    #[inline]
    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.lookup(name).map(|symbol| symbol.kind)
    }

    #[inline]
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|symbol| symbol.ty.as_str())
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|symbol| symbol.index)
    }

    /// Number of symbols of the given kind defined so far.
    #[inline]
    pub fn count_of(&self, kind: SymbolKind) -> u16 {
        self.counts[kind.slot()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// Name already defined in the same scope level.
    Duplicate { name: SmolStr, existing: SymbolKind },
    /// More symbols of one kind than an index can address.
    Overflow { kind: SymbolKind },
}

impl error::Error for SymbolError {}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolError::Duplicate { name, existing } => {
                write!(f, "'{name}' is already defined as {existing} variable")
            }
            SymbolError::Overflow { kind } => write!(f, "too many {kind} variables"),
        }
    }
}
