//! Runtime error types.
//!
//! Initialization errors ([`LoadError`], [`StructureError`], [`InitError`]) are
//! fatal: no partially loaded database is ever usable. Call-time errors are
//! [`BindError`] and surface to the caller of the specific operation.

use gdbind_sdk::ChannelError;

/// Result type for call-time operations
pub type BindResult<T> = Result<T, BindError>;

/// Malformed or unresolvable class database.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File I/O error
    #[error("Failed to read class database: {0}")]
    Io(#[from] std::io::Error),

    /// Not valid JSON, or the wrong shape
    #[error("Malformed class database: {0}")]
    Json(#[from] serde_json::Error),

    /// Format version this loader does not understand
    #[error("Unsupported class database version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version in the document
        found: u32,
        /// Version this loader reads
        expected: u32,
    },

    /// No classes at all
    #[error("Class database declares no classes")]
    Empty,

    /// Two classes share a name
    #[error("Duplicate class '{0}'")]
    DuplicateClass(String),

    /// Parent name does not resolve to a declared class
    #[error("Class '{class}' inherits from unknown class '{parent}'")]
    UnresolvedParent {
        /// Declaring class
        class: String,
        /// Parent name as written
        parent: String,
    },

    /// Type tag is not recognized
    #[error("Unknown type tag '{tag}' in {context}")]
    UnknownTypeTag {
        /// Tag as written
        tag: String,
        /// Where the tag appeared (`Class.member`)
        context: String,
    },

    /// `nil` used as a parameter or property type
    #[error("'nil' is not a valid value type in {0}")]
    NilParameter(String),

    /// Two methods with the same name on one class
    #[error("Class '{class}' declares method '{method}' twice")]
    DuplicateMethod {
        /// Declaring class
        class: String,
        /// Method name
        method: String,
    },

    /// Property getter or setter does not name a visible method
    #[error("Property '{class}.{property}' uses unknown accessor '{accessor}'")]
    UnresolvedAccessor {
        /// Declaring class
        class: String,
        /// Property name
        property: String,
        /// Accessor method name
        accessor: String,
    },

    /// Property accessor exists but its signature does not fit the property
    #[error("Property '{class}.{property}' cannot use '{accessor}': {reason}")]
    AccessorSignature {
        /// Declaring class
        class: String,
        /// Property name
        property: String,
        /// Accessor method name
        accessor: String,
        /// What does not fit
        reason: String,
    },

    /// Two singleton classes bind the same module name
    #[error("Singleton name '{name}' is used by both '{first}' and '{second}'")]
    DuplicateSingleton {
        /// Module binding name
        name: String,
        /// Class declared first
        first: String,
        /// Class declared second
        second: String,
    },

    /// A singleton binding name equals the name of a different class
    #[error("Singleton '{class}' is bound as '{name}', which is another class")]
    SingletonShadowsClass {
        /// Singleton class
        class: String,
        /// Module binding name
        name: String,
    },
}

/// Cyclic or multi-rooted parent graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// The parent relation contains a cycle
    #[error("Inheritance cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    /// More than one class has no parent
    #[error("Class database has several roots: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),
}

/// Fatal initialization failure.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// Database could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Database parent graph is invalid
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// A singleton could not be obtained from the engine
    #[error("Failed to obtain singleton '{name}': {source}")]
    Singleton {
        /// Binding name looked up
        name: String,
        /// Lookup or wrapping failure
        #[source]
        source: BindError,
    },

    /// Runtime options file could not be read
    #[error("Failed to read runtime options: {0}")]
    OptionsIo(#[source] std::io::Error),

    /// Runtime options are not valid TOML
    #[error("Invalid runtime options: {0}")]
    Options(#[from] toml::de::Error),

    /// A process-wide runtime is already installed
    #[error("A runtime is already installed")]
    AlreadyInstalled,
}

/// Call-time failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    /// Argument cannot be marshalled to the declared parameter type
    #[error("{method}: {message}")]
    ArgumentType {
        /// Qualified member (`Class.method`)
        method: String,
        /// Offending argument position, `None` for arity errors
        index: Option<usize>,
        /// Description of the mismatch
        message: String,
    },

    /// Write to a constant, method, signal or read-only property
    #[error("'{class}.{member}' is read-only")]
    ImmutableMember {
        /// Class exposing the member
        class: String,
        /// Member name
        member: String,
    },

    /// The native channel reported failure
    #[error("Native call '{method}' failed: {source}")]
    NativeCall {
        /// Method invoked on the channel
        method: String,
        /// Channel failure
        #[source]
        source: ChannelError,
    },

    /// No member of that name
    #[error("'{class}' has no member '{member}'")]
    UnknownMember {
        /// Class or module searched
        class: String,
        /// Requested name
        member: String,
    },

    /// Member exists but is not a method
    #[error("'{class}.{member}' is not callable")]
    NotCallable {
        /// Class exposing the member
        class: String,
        /// Member name
        member: String,
    },

    /// Class is not instantiable from the embedding side
    #[error("Class '{0}' cannot be instantiated")]
    NotInstantiable(String),

    /// Class name does not exist in the database
    #[error("Unknown class '{0}'")]
    UnknownClass(String),
}

impl BindError {
    /// Wrap a channel failure for `method`
    pub fn native(method: &str, source: ChannelError) -> Self {
        BindError::NativeCall {
            method: method.to_string(),
            source,
        }
    }
}
