//! Three-way manifest merge engine.
//!
//! Reconciles an **original** baseline, a **target** baseline and an
//! **installed** (possibly customized) copy of a structured manifest into a
//! patch that moves the installed copy toward the target, keeps deliberate
//! local customizations and surfaces true conflicts.
//!
//! Retrieving the manifests, parsing version constraints and writing the
//! result back are left to the host. The host supplies a [`Console`] for
//! messages and questions and decides how conflicts are handled through
//! [`MergeOptions`].

// Value model
pub mod value;

// Errors and operator console
pub mod console;
pub mod errors;

// Delta classification and conflict policy
pub mod classifier;
pub mod policy;

// Mergers
pub mod entities;
pub mod order;
pub mod tree;

// Section driver
pub mod merger;
pub mod patch;
pub mod settings;


// Re-export for convenient access
pub use classifier::{classify, Delta, DeltaAction};
pub use console::{BufferedConsole, Console, FormatTag, LoggedMessage, Verbosity};
pub use entities::{
    merge_entities, ConstraintParser, EntityCollection, LiteralConstraints, NamedEntity,
};
pub use errors::{EngineResult, MergeError};
pub use merger::ManifestMerger;
pub use order::{reconcile_order, OrderDecision};
pub use patch::{MergeReport, MergeResult, Patch, PatchEntry};
pub use policy::{ConflictMode, ConflictRecord, MergeContext, MergeOptions, Resolution};
pub use settings::{MergeSettings, SectionKind};
pub use tree::merge_tree;
pub use value::{ConfigMap, ConfigValue, ScalarValue};
