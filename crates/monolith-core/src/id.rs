use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies an energy-input provider in the provider arena.
    pub struct EnergyKey;

    /// Identifies a fluid-import provider in the provider arena.
    pub struct FluidKey;

    /// Identifies an item-export provider in the provider arena.
    pub struct ItemExportKey;

    /// Identifies a maintenance hatch in the provider arena.
    pub struct MaintenanceKey;
}

/// Identifies a block type in the world. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockTypeId(pub u32);

/// The empty cell. World views report this where nothing is placed.
pub const AIR: BlockTypeId = BlockTypeId(0);

/// Identifies an item type. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemTypeId(pub u32);

/// Identifies a fluid type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FluidTypeId(pub u32);

/// Identifies a recipe known to the recipe-lookup collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeId(pub u32);

/// Identifies the dimension (world shard) a machine lives in. Carried by
/// broadcast messages so observers can scope them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionId(pub u32);
