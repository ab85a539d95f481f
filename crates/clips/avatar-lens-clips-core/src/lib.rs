//! avatar-lens-clips-core
//!
//! Static analysis of an avatar's animator layers and expression menu:
//!
//! - [`index`] walks every layer's state machines and blend trees and records,
//!   for each reachable clip, the parameter value that plays it.
//! - [`classify`] joins menu controls against that index and collects the
//!   clips no control can reach under `Uncategorized`.
//! - [`catalog`] packages the published list for a clip dropdown.
//!
//! Everything here is a pure function of already-loaded asset data.

pub mod catalog;
pub mod classify;
pub mod index;
pub mod record;

pub use catalog::ClipCatalog;
pub use classify::{classify, publish, referenced_parameters, uncategorized};
pub use index::{build_index, index_layer, index_state};
pub use record::{ClassifiedClip, ParameterClipRecord, NO_PARAMETER, UNCATEGORIZED_PATH};
