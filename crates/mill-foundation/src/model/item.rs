//! Declarations and usages: the items a safe delete either removes or reports.

use crate::error::MillResult;
use crate::model::{Location, TargetPointer};
use crate::planning::FileOperation;
use std::fmt;
use std::sync::Arc;

/// Produces the edits that remove one declaration or usage.
///
/// Implementations only describe edits; nothing is applied until the engine
/// commits the aggregated operations in a single transaction.
pub trait FileUpdater: Send + Sync {
    fn prepare_update(&self) -> MillResult<Vec<FileOperation>>;
}

/// Updater that removes exactly the item's own range
#[derive(Debug, Clone)]
pub struct DeleteRangeUpdater {
    location: Location,
    description: String,
}

impl DeleteRangeUpdater {
    pub fn new(location: Location, description: impl Into<String>) -> Self {
        Self {
            location,
            description: description.into(),
        }
    }
}

impl FileUpdater for DeleteRangeUpdater {
    fn prepare_update(&self) -> MillResult<Vec<FileOperation>> {
        Ok(vec![FileOperation::delete_range(
            self.location.clone(),
            self.description.clone(),
        )])
    }
}

/// Common view over declarations and usages used by classification
pub trait SafeDeleteItem {
    fn target(&self) -> TargetPointer;
    fn location(&self) -> &Location;
    fn is_safe_to_delete(&self) -> bool;
    fn conflict_message(&self) -> Option<&str>;
    fn prepare_update(&self) -> MillResult<Vec<FileOperation>>;
}

/// The location that IS a target's own definition
#[derive(Clone)]
pub struct Declaration {
    pub target: TargetPointer,
    pub location: Location,
    pub is_safe_to_delete: bool,
    pub conflict_message: Option<String>,
    updater: Arc<dyn FileUpdater>,
}

/// A reference to a target found elsewhere in the project
#[derive(Clone)]
pub struct Usage {
    pub target: TargetPointer,
    pub location: Location,
    pub is_safe_to_delete: bool,
    pub conflict_message: Option<String>,
    updater: Arc<dyn FileUpdater>,
}

macro_rules! impl_safe_delete_item {
    ($($item:ident),+) => {
        $(
            impl $item {
                /// Create a safe item whose edits come from `updater`
                pub fn new(
                    target: TargetPointer,
                    location: Location,
                    updater: Arc<dyn FileUpdater>,
                ) -> Self {
                    Self {
                        target,
                        location,
                        is_safe_to_delete: true,
                        conflict_message: None,
                        updater,
                    }
                }

                /// Create a safe item that deletes its own range
                pub fn deleting_range(target: TargetPointer, location: Location) -> Self {
                    let description = format!(
                        "Delete {} at {}:{}..{}",
                        stringify!($item).to_lowercase(),
                        location.file.display(),
                        location.range.start,
                        location.range.end
                    );
                    let updater = Arc::new(DeleteRangeUpdater::new(location.clone(), description));
                    Self::new(target, location, updater)
                }

                /// Mark the item as blocking, optionally with a message
                pub fn mark_unsafe(&mut self, message: Option<String>) {
                    self.is_safe_to_delete = false;
                    self.conflict_message = message;
                }

                pub fn with_conflict(mut self, message: impl Into<String>) -> Self {
                    self.mark_unsafe(Some(message.into()));
                    self
                }

                /// Unsafe without an explanatory message
                pub fn unlabeled_conflict(mut self) -> Self {
                    self.mark_unsafe(None);
                    self
                }
            }

            impl SafeDeleteItem for $item {
                fn target(&self) -> TargetPointer {
                    self.target
                }

                fn location(&self) -> &Location {
                    &self.location
                }

                fn is_safe_to_delete(&self) -> bool {
                    self.is_safe_to_delete
                }

                fn conflict_message(&self) -> Option<&str> {
                    self.conflict_message.as_deref()
                }

                fn prepare_update(&self) -> MillResult<Vec<FileOperation>> {
                    self.updater.prepare_update()
                }
            }

            impl fmt::Debug for $item {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($item))
                        .field("target", &self.target)
                        .field("location", &self.location)
                        .field("is_safe_to_delete", &self.is_safe_to_delete)
                        .field("conflict_message", &self.conflict_message)
                        .finish_non_exhaustive()
                }
            }
        )+
    };
}

impl_safe_delete_item!(Declaration, Usage);
