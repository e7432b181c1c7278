//! Declarative structure templates and the matcher that validates them
//! against a world.
//!
//! A template is a stack of *slabs* (vertical cross-sections) written as
//! rows of symbol characters, with each symbol bound to an ordered list of
//! [`CellPredicate`]s. Matching walks every cell, tries its predicates in
//! order, and either produces the collected ability keys plus match context
//! or reports the first offending world position.
//!
//! The walk frame is derived from the controller's facing: slabs extend
//! behind the controller (away from its face), rows run top to bottom, and
//! columns run along the facing rotated clockwise when viewed from above.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ability::{AbilityKind, AbilitySet, ProviderRef};
use crate::id::{BlockTypeId, AIR};
use crate::pos::{Orientation, Position3};
use crate::providers::WorldView;

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// What one predicate accepts at a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellCheck {
    /// The controller block itself. Valid only at the template's own
    /// controller cell.
    Controller,
    /// Exactly this block type.
    Block(BlockTypeId),
    /// Any of these block types.
    AnyOf(Vec<BlockTypeId>),
    /// A provider of this role registered at the position.
    Ability(AbilityKind),
    /// The empty cell.
    Air,
    /// Anything at all, air included.
    Anything,
}

impl CellCheck {
    fn describe(&self) -> String {
        match self {
            CellCheck::Controller => "controller".into(),
            CellCheck::Block(id) => format!("block {}", id.0),
            CellCheck::AnyOf(ids) => format!("one of {} block types", ids.len()),
            CellCheck::Ability(kind) => format!("{kind:?} provider"),
            CellCheck::Air => "air".into(),
            CellCheck::Anything => "anything".into(),
        }
    }
}

/// One alternative a cell may satisfy, with optional counting limits.
///
/// Alternatives bound to the same symbol are tried in order; the first
/// available match wins and is the one counted. A predicate whose
/// `max_global` or `max_per_slab` is already reached stops matching, which
/// is how "at most one maintenance hatch" style rules are expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPredicate {
    check: CellCheck,
    min_global: Option<u32>,
    max_global: Option<u32>,
    max_per_slab: Option<u32>,
    collect: Option<String>,
}

impl CellPredicate {
    pub fn controller() -> Self {
        Self::of(CellCheck::Controller)
    }

    pub fn block(id: BlockTypeId) -> Self {
        Self::of(CellCheck::Block(id))
    }

    pub fn any_of(ids: Vec<BlockTypeId>) -> Self {
        Self::of(CellCheck::AnyOf(ids))
    }

    pub fn ability(kind: AbilityKind) -> Self {
        Self::of(CellCheck::Ability(kind))
    }

    pub fn air() -> Self {
        Self::of(CellCheck::Air)
    }

    pub fn anything() -> Self {
        Self::of(CellCheck::Anything)
    }

    fn of(check: CellCheck) -> Self {
        Self {
            check,
            min_global: None,
            max_global: None,
            max_per_slab: None,
            collect: None,
        }
    }

    /// Require at least `n` matches of this predicate across the structure.
    pub fn with_min_global(mut self, n: u32) -> Self {
        self.min_global = Some(n);
        self
    }

    /// Allow at most `n` matches of this predicate across the structure.
    pub fn with_max_global(mut self, n: u32) -> Self {
        self.max_global = Some(n);
        self
    }

    /// Allow at most `n` matches of this predicate within one slab.
    pub fn with_max_per_slab(mut self, n: u32) -> Self {
        self.max_per_slab = Some(n);
        self
    }

    /// Record the world position of every match under `key` in the
    /// match context.
    pub fn collecting(mut self, key: &str) -> Self {
        self.collect = Some(key.to_owned());
        self
    }
}

/// The ordered predicate list bound to one template symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureCell {
    predicates: Vec<CellPredicate>,
}

impl StructureCell {
    fn describe(&self) -> String {
        self.predicates
            .iter()
            .map(|p| p.check.describe())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Why a template failed to build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template has no slabs")]
    Empty,
    #[error("slab {slab} has a different row count than slab 0")]
    RaggedSlab { slab: usize },
    #[error("slab {slab} row {row} has a different column count than the first row")]
    RaggedRow { slab: usize, row: usize },
    #[error("symbol '{symbol}' appears in the layout but is not bound")]
    UnboundSymbol { symbol: char },
    #[error("template binds no controller cell")]
    NoController,
    #[error("template binds more than one controller cell")]
    MultipleControllers,
}

/// An immutable, validated multiblock shape.
///
/// Built once per machine type and shared by every instance; matching never
/// mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureTemplate {
    slabs: Vec<Vec<String>>,
    cells: BTreeMap<char, StructureCell>,
    controller_offset: (usize, usize, usize),
}

impl StructureTemplate {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    /// `(slabs, rows, columns)` of the layout.
    pub fn dimensions(&self) -> (usize, usize, usize) {
        let rows = self.slabs[0].len();
        let cols = self.slabs[0][0].chars().count();
        (self.slabs.len(), rows, cols)
    }

    /// World position of layout cell `(slab, row, col)` for a controller at
    /// `origin` facing `facing`.
    pub fn world_pos(
        &self,
        origin: Position3,
        facing: Orientation,
        at: (usize, usize, usize),
    ) -> Position3 {
        let back = facing.opposite().unit();
        let right = facing.rotate_cw_y().unit();
        let down = cross(right, back);
        let (a0, r0, c0) = self.controller_offset;
        let ds = at.0 as i32 - a0 as i32;
        let dr = at.1 as i32 - r0 as i32;
        let dc = at.2 as i32 - c0 as i32;
        origin.offset(
            back.0 * ds + down.0 * dr + right.0 * dc,
            back.1 * ds + down.1 * dr + right.1 * dc,
            back.2 * ds + down.2 * dr + right.2 * dc,
        )
    }
}

fn cross(a: (i32, i32, i32), b: (i32, i32, i32)) -> (i32, i32, i32) {
    (
        a.1 * b.2 - a.2 * b.1,
        a.2 * b.0 - a.0 * b.2,
        a.0 * b.1 - a.1 * b.0,
    )
}

/// Accumulates slabs and symbol bindings, then validates into a
/// [`StructureTemplate`].
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    slabs: Vec<Vec<String>>,
    cells: BTreeMap<char, StructureCell>,
}

impl TemplateBuilder {
    /// Append one slab, front to back. Each string is one row, top first.
    pub fn slab(mut self, rows: &[&str]) -> Self {
        self.slabs.push(rows.iter().map(|r| (*r).to_owned()).collect());
        self
    }

    /// Bind a symbol to its predicate alternatives. Rebinding a symbol
    /// replaces the earlier binding.
    pub fn cell(mut self, symbol: char, predicates: Vec<CellPredicate>) -> Self {
        self.cells.insert(symbol, StructureCell { predicates });
        self
    }

    pub fn build(self) -> Result<StructureTemplate, TemplateError> {
        if self.slabs.is_empty() {
            return Err(TemplateError::Empty);
        }
        let rows = self.slabs[0].len();
        let cols = self.slabs[0].first().map_or(0, |r| r.chars().count());
        for (a, slab) in self.slabs.iter().enumerate() {
            if slab.len() != rows {
                return Err(TemplateError::RaggedSlab { slab: a });
            }
            for (r, row) in slab.iter().enumerate() {
                if row.chars().count() != cols {
                    return Err(TemplateError::RaggedRow { slab: a, row: r });
                }
            }
        }

        let mut controller = None;
        for (a, slab) in self.slabs.iter().enumerate() {
            for (r, row) in slab.iter().enumerate() {
                for (c, symbol) in row.chars().enumerate() {
                    let cell = self
                        .cells
                        .get(&symbol)
                        .ok_or(TemplateError::UnboundSymbol { symbol })?;
                    let is_controller = cell
                        .predicates
                        .iter()
                        .any(|p| p.check == CellCheck::Controller);
                    if is_controller {
                        if controller.is_some() {
                            return Err(TemplateError::MultipleControllers);
                        }
                        controller = Some((a, r, c));
                    }
                }
            }
        }
        let controller_offset = controller.ok_or(TemplateError::NoController)?;

        Ok(StructureTemplate {
            slabs: self.slabs,
            cells: self.cells,
            controller_offset,
        })
    }
}

// ---------------------------------------------------------------------------
// Match results
// ---------------------------------------------------------------------------

/// First position where the world disagreed with the template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("structure mismatch at ({x}, {y}, {z}): expected {expected}", x = .at.x, y = .at.y, z = .at.z)]
pub struct MatchFailure {
    pub at: Position3,
    /// Human-readable description of what the cell accepts.
    pub expected: String,
}

/// Values collected while matching, keyed by the collector name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Positions(Vec<Position3>),
    Count(u32),
}

/// Key/value facts gathered during one successful match.
///
/// Rebuilt from scratch on every match; nothing here outlives a formation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchContext {
    entries: BTreeMap<String, ContextValue>,
}

impl MatchContext {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `pos` to the position list under `key`.
    pub fn push_position(&mut self, key: &str, pos: Position3) {
        match self
            .entries
            .entry(key.to_owned())
            .or_insert_with(|| ContextValue::Positions(Vec::new()))
        {
            ContextValue::Positions(list) => list.push(pos),
            ContextValue::Count(_) => {}
        }
    }

    /// Positions recorded under `key`, empty if none.
    pub fn positions(&self, key: &str) -> &[Position3] {
        match self.entries.get(key) {
            Some(ContextValue::Positions(list)) => list,
            _ => &[],
        }
    }

    /// Increment the counter under `key`.
    pub fn bump(&mut self, key: &str) {
        match self
            .entries
            .entry(key.to_owned())
            .or_insert(ContextValue::Count(0))
        {
            ContextValue::Count(n) => *n += 1,
            ContextValue::Positions(_) => {}
        }
    }

    /// Counter value under `key`, zero if none.
    pub fn count(&self, key: &str) -> u32 {
        match self.entries.get(key) {
            Some(ContextValue::Count(n)) => *n,
            _ => 0,
        }
    }
}

/// Everything a successful match hands to the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormedStructure {
    pub abilities: AbilitySet,
    pub context: MatchContext,
}

/// Outcome of one structure check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Formed(FormedStructure),
    NotFormed(MatchFailure),
}

impl MatchResult {
    pub fn is_formed(&self) -> bool {
        matches!(self, MatchResult::Formed(_))
    }

    pub fn into_result(self) -> Result<FormedStructure, MatchFailure> {
        match self {
            MatchResult::Formed(formed) => Ok(formed),
            MatchResult::NotFormed(failure) => Err(failure),
        }
    }
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Validates templates against a world. The seam exists so tests and hosts
/// can substitute their own placement logic.
pub trait StructureMatcher {
    fn check_at(
        &self,
        world: &dyn WorldView,
        origin: Position3,
        facing: Orientation,
        template: &StructureTemplate,
    ) -> MatchResult;
}

/// Reference matcher: a straight walk over every layout cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateMatcher;

impl StructureMatcher for TemplateMatcher {
    fn check_at(
        &self,
        world: &dyn WorldView,
        origin: Position3,
        facing: Orientation,
        template: &StructureTemplate,
    ) -> MatchResult {
        let mut abilities = AbilitySet::default();
        let mut context = MatchContext::default();
        // Match counts per (symbol, predicate index).
        let mut global: BTreeMap<(char, usize), u32> = BTreeMap::new();

        for (a, slab) in template.slabs.iter().enumerate() {
            let mut in_slab: BTreeMap<(char, usize), u32> = BTreeMap::new();
            for (r, row) in slab.iter().enumerate() {
                for (c, symbol) in row.chars().enumerate() {
                    let pos = template.world_pos(origin, facing, (a, r, c));
                    let cell = &template.cells[&symbol];

                    let mut matched = None;
                    for (pi, pred) in cell.predicates.iter().enumerate() {
                        let seen_global = global.get(&(symbol, pi)).copied().unwrap_or(0);
                        let seen_slab = in_slab.get(&(symbol, pi)).copied().unwrap_or(0);
                        if pred.max_global.is_some_and(|max| seen_global >= max)
                            || pred.max_per_slab.is_some_and(|max| seen_slab >= max)
                        {
                            continue;
                        }
                        if let Some(provider) = check_cell(&pred.check, world, pos, origin) {
                            matched = Some((pi, pred, provider));
                            break;
                        }
                    }

                    let Some((pi, pred, provider)) = matched else {
                        return MatchResult::NotFormed(MatchFailure {
                            at: pos,
                            expected: cell.describe(),
                        });
                    };

                    *global.entry((symbol, pi)).or_insert(0) += 1;
                    *in_slab.entry((symbol, pi)).or_insert(0) += 1;
                    if let Some(provider) = provider {
                        abilities.push(provider);
                    }
                    if let Some(key) = &pred.collect {
                        context.push_position(key, pos);
                    }
                }
            }
        }

        // Minimum counts are only checkable once the whole walk succeeded.
        for (symbol, cell) in &template.cells {
            for (pi, pred) in cell.predicates.iter().enumerate() {
                if let Some(min) = pred.min_global {
                    let seen = global.get(&(*symbol, pi)).copied().unwrap_or(0);
                    if seen < min {
                        return MatchResult::NotFormed(MatchFailure {
                            at: origin,
                            expected: format!("at least {min} of {}", pred.check.describe()),
                        });
                    }
                }
            }
        }

        MatchResult::Formed(FormedStructure { abilities, context })
    }
}

/// `Some` when the check passes; the inner value is the provider reference
/// for ability checks. Outside of ability checks no provider is collected.
fn check_cell(
    check: &CellCheck,
    world: &dyn WorldView,
    pos: Position3,
    origin: Position3,
) -> Option<Option<ProviderRef>> {
    match check {
        CellCheck::Controller => (pos == origin).then_some(None),
        CellCheck::Block(id) => (world.block_at(pos) == *id).then_some(None),
        CellCheck::AnyOf(ids) => ids.contains(&world.block_at(pos)).then_some(None),
        CellCheck::Ability(kind) => {
            let provider = world.provider_at(pos)?;
            (provider.kind() == *kind).then_some(Some(provider))
        }
        CellCheck::Air => (world.block_at(pos) == AIR).then_some(None),
        CellCheck::Anything => Some(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderArena;
    use crate::test_utils::{
        hatch_block, steel_casing, variant_casing, TestEnergyProvider, TestWorld,
    };

    fn casing_cube() -> StructureTemplate {
        StructureTemplate::builder()
            .slab(&["CCC", "CSC", "CCC"])
            .slab(&["CCC", "C#C", "CCC"])
            .slab(&["CCC", "CCC", "CCC"])
            .cell(
                'C',
                vec![
                    CellPredicate::block(steel_casing()),
                    CellPredicate::ability(AbilityKind::EnergyInput).with_max_global(2),
                ],
            )
            .cell('S', vec![CellPredicate::controller()])
            .cell('#', vec![CellPredicate::air()])
            .build()
            .unwrap()
    }

    /// Fill the world with casings everywhere the template expects one.
    fn fill_casings(world: &mut TestWorld, template: &StructureTemplate, facing: Orientation) {
        let origin = Position3::new(0, 64, 0);
        let (slabs, rows, cols) = template.dimensions();
        for a in 0..slabs {
            for r in 0..rows {
                for c in 0..cols {
                    let pos = template.world_pos(origin, facing, (a, r, c));
                    if pos == origin {
                        continue;
                    }
                    // The hollow interior cell stays air.
                    if (a, r, c) == (1, 1, 1) {
                        continue;
                    }
                    world.set_block(pos, steel_casing());
                }
            }
        }
    }

    // === Builder validation ===

    #[test]
    fn builder_rejects_unbound_symbols() {
        let err = StructureTemplate::builder()
            .slab(&["CS"])
            .cell('S', vec![CellPredicate::controller()])
            .build()
            .unwrap_err();
        assert_eq!(err, TemplateError::UnboundSymbol { symbol: 'C' });
    }

    #[test]
    fn builder_rejects_ragged_layouts() {
        let err = StructureTemplate::builder()
            .slab(&["CC", "C"])
            .cell('C', vec![CellPredicate::block(steel_casing())])
            .build()
            .unwrap_err();
        assert_eq!(err, TemplateError::RaggedRow { slab: 0, row: 1 });

        let err = StructureTemplate::builder()
            .slab(&["CS"])
            .slab(&["CC", "CC"])
            .cell('C', vec![CellPredicate::block(steel_casing())])
            .cell('S', vec![CellPredicate::controller()])
            .build()
            .unwrap_err();
        assert_eq!(err, TemplateError::RaggedSlab { slab: 1 });
    }

    #[test]
    fn builder_requires_exactly_one_controller() {
        let err = StructureTemplate::builder()
            .slab(&["CC"])
            .cell('C', vec![CellPredicate::block(steel_casing())])
            .build()
            .unwrap_err();
        assert_eq!(err, TemplateError::NoController);

        let err = StructureTemplate::builder()
            .slab(&["SS"])
            .cell('S', vec![CellPredicate::controller()])
            .build()
            .unwrap_err();
        assert_eq!(err, TemplateError::MultipleControllers);
    }

    // === Matching ===

    #[test]
    fn exact_world_forms() {
        let template = casing_cube();
        let mut world = TestWorld::new();
        fill_casings(&mut world, &template, Orientation::North);

        let result = TemplateMatcher.check_at(
            &world,
            Position3::new(0, 64, 0),
            Orientation::North,
            &template,
        );
        assert!(result.is_formed());
    }

    #[test]
    fn mismatch_reports_the_offending_position() {
        let template = casing_cube();
        let mut world = TestWorld::new();
        let facing = Orientation::North;
        fill_casings(&mut world, &template, facing);

        // Knock out one casing in the back slab.
        let hole = template.world_pos(Position3::new(0, 64, 0), facing, (2, 2, 2));
        world.set_block(hole, AIR);

        let failure = TemplateMatcher
            .check_at(&world, Position3::new(0, 64, 0), facing, &template)
            .into_result()
            .unwrap_err();
        assert_eq!(failure.at, hole);
        assert!(failure.expected.contains("block"));
        assert!(format!("{failure}").contains("structure mismatch at ("));
    }

    #[test]
    fn interior_must_stay_hollow() {
        let template = casing_cube();
        let mut world = TestWorld::new();
        let facing = Orientation::North;
        fill_casings(&mut world, &template, facing);

        let interior = template.world_pos(Position3::new(0, 64, 0), facing, (1, 1, 1));
        world.set_block(interior, steel_casing());

        let failure = TemplateMatcher
            .check_at(&world, Position3::new(0, 64, 0), facing, &template)
            .into_result()
            .unwrap_err();
        assert_eq!(failure.at, interior);
        assert_eq!(failure.expected, "air");
    }

    #[test]
    fn ability_cells_collect_keys_in_discovery_order() {
        let template = casing_cube();
        let mut world = TestWorld::new();
        let facing = Orientation::North;
        let origin = Position3::new(0, 64, 0);
        fill_casings(&mut world, &template, facing);

        let mut arena = ProviderArena::new();
        let first = arena.add_energy(Box::new(TestEnergyProvider::new(0, 100, 32)));
        let second = arena.add_energy(Box::new(TestEnergyProvider::new(0, 100, 32)));
        // (0, 2, 0) walks before (2, 0, 0).
        let early = template.world_pos(origin, facing, (0, 2, 0));
        let late = template.world_pos(origin, facing, (2, 0, 0));
        world.place_provider(late, hatch_block(), ProviderRef::Energy(second));
        world.place_provider(early, hatch_block(), ProviderRef::Energy(first));

        let formed = TemplateMatcher
            .check_at(&world, origin, facing, &template)
            .into_result()
            .unwrap();
        assert_eq!(formed.abilities.energy_inputs, vec![first, second]);
    }

    #[test]
    fn max_global_stops_further_matches() {
        let template = casing_cube();
        let mut world = TestWorld::new();
        let facing = Orientation::North;
        let origin = Position3::new(0, 64, 0);
        fill_casings(&mut world, &template, facing);

        let mut arena = ProviderArena::new();
        // Third hatch exceeds the max of two; its cell then matches nothing.
        let spots = [(0, 2, 0), (0, 2, 2), (2, 0, 0)];
        let mut last = origin;
        for at in spots {
            let key = arena.add_energy(Box::new(TestEnergyProvider::new(0, 100, 32)));
            last = template.world_pos(origin, facing, at);
            world.place_provider(last, hatch_block(), ProviderRef::Energy(key));
        }

        let failure = TemplateMatcher
            .check_at(&world, origin, facing, &template)
            .into_result()
            .unwrap_err();
        assert_eq!(failure.at, last);
    }

    #[test]
    fn min_global_enforced_after_the_walk() {
        let template = StructureTemplate::builder()
            .slab(&["CS"])
            .cell(
                'C',
                vec![
                    CellPredicate::block(steel_casing()),
                    CellPredicate::block(variant_casing()).with_min_global(1),
                ],
            )
            .cell('S', vec![CellPredicate::controller()])
            .build()
            .unwrap();

        let origin = Position3::new(0, 64, 0);
        let facing = Orientation::North;
        let mut world = TestWorld::new();
        let cell = template.world_pos(origin, facing, (0, 0, 0));
        world.set_block(cell, steel_casing());

        let failure = TemplateMatcher
            .check_at(&world, origin, facing, &template)
            .into_result()
            .unwrap_err();
        assert_eq!(failure.at, origin);
        assert!(failure.expected.starts_with("at least 1"));

        // The variant block satisfies the earlier predicate's minimum.
        world.set_block(cell, variant_casing());
        assert!(TemplateMatcher
            .check_at(&world, origin, facing, &template)
            .is_formed());
    }

    #[test]
    fn collector_records_match_positions() {
        let template = StructureTemplate::builder()
            .slab(&["VSV"])
            .cell(
                'V',
                vec![CellPredicate::block(variant_casing()).collecting("variant_blocks")],
            )
            .cell('S', vec![CellPredicate::controller()])
            .build()
            .unwrap();

        let origin = Position3::new(0, 64, 0);
        let facing = Orientation::North;
        let left = template.world_pos(origin, facing, (0, 0, 0));
        let right = template.world_pos(origin, facing, (0, 0, 2));
        let mut world = TestWorld::new();
        world.set_block(left, variant_casing());
        world.set_block(right, variant_casing());

        let formed = TemplateMatcher
            .check_at(&world, origin, facing, &template)
            .into_result()
            .unwrap();
        assert_eq!(formed.context.positions("variant_blocks"), &[left, right]);
        assert_eq!(formed.context.positions("missing"), &[] as &[Position3]);
    }

    #[test]
    fn facing_rotates_the_frame() {
        let template = casing_cube();
        let mut world = TestWorld::new();
        fill_casings(&mut world, &template, Orientation::East);

        let origin = Position3::new(0, 64, 0);
        assert!(TemplateMatcher
            .check_at(&world, origin, Orientation::East, &template)
            .is_formed());
        // The same blocks do not satisfy a north-facing walk.
        assert!(!TemplateMatcher
            .check_at(&world, origin, Orientation::North, &template)
            .is_formed());
    }

    #[test]
    fn world_pos_places_slabs_behind_the_face() {
        let template = casing_cube();
        let origin = Position3::new(10, 64, 10);
        // Facing north: the structure extends south (+z), rows descend (-y),
        // columns run east (+x).
        let behind = template.world_pos(origin, Orientation::North, (2, 1, 1));
        assert_eq!(behind, origin.offset(0, 0, 2));
        let below = template.world_pos(origin, Orientation::North, (0, 2, 1));
        assert_eq!(below, origin.offset(0, -1, 0));
        let right = template.world_pos(origin, Orientation::North, (0, 1, 2));
        assert_eq!(right, origin.offset(1, 0, 0));
    }

    #[test]
    fn context_counters() {
        let mut ctx = MatchContext::default();
        assert_eq!(ctx.count("coils"), 0);
        ctx.bump("coils");
        ctx.bump("coils");
        assert_eq!(ctx.count("coils"), 2);
        assert!(!ctx.is_empty());
    }
}
