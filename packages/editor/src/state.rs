use serde::{Deserialize, Serialize};

use crate::config::{CanvasState, UiState};
use crate::selection::SelectionModel;
use crate::store::ComponentStore;

/// Full builder state snapshot
///
/// Deep copy of everything undo needs to restore: the forest, the selection
/// and the canvas/UI view state. The clipboard is not part of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuilderState {
    pub store: ComponentStore,
    pub selection: SelectionModel,
    pub canvas: CanvasState,
    pub ui: UiState,
}
