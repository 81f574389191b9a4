use std::collections::BTreeMap;

use crate::{
    foundation::error::{ChoreoError, ChoreoResult},
    layering::SemanticLayer,
};

/// Depth distance between adjacent semantic layers.
pub const LAYER_STRIDE: i64 = 100_000;
/// Depth distance between consecutive members of one layer.
pub const DEPTH_SPACING: i64 = 10;
/// Largest custom offset; keeps a member strictly between its neighbours.
pub const MAX_OFFSET: i64 = 4;

const LAYER_CAPACITY: usize = (LAYER_STRIDE / DEPTH_SPACING) as usize;

/// New depth of one object after a mutation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DepthUpdate {
    /// Object id.
    pub id: String,
    /// Depth after the mutation.
    pub depth: i64,
}

#[derive(Clone, Debug)]
struct Member {
    id: String,
    offset: i64,
}

/// Assigns stable depths to objects grouped by [`SemanticLayer`].
///
/// `depth = layer.base_depth() + index * DEPTH_SPACING + offset`, where `index` is the member's
/// position inside its layer. Mutations only touch the affected layer and report the depths
/// that changed.
#[derive(Clone, Debug, Default)]
pub struct DepthManager {
    layers: BTreeMap<SemanticLayer, Vec<Member>>,
    index: BTreeMap<String, SemanticLayer>,
}

impl DepthManager {
    /// Empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of managed objects.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Return `true` when no objects are managed.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Return `true` when `id` is managed.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Append `id` to the front of `layer`.
    pub fn add(&mut self, id: &str, layer: SemanticLayer) -> ChoreoResult<Vec<DepthUpdate>> {
        self.add_with_offset(id, layer, 0)
    }

    /// Append `id` to the front of `layer` with a custom offset.
    pub fn add_with_offset(
        &mut self,
        id: &str,
        layer: SemanticLayer,
        offset: i64,
    ) -> ChoreoResult<Vec<DepthUpdate>> {
        if id.is_empty() {
            return Err(ChoreoError::validation("object id must be non-empty"));
        }
        if self.index.contains_key(id) {
            return Err(ChoreoError::validation(format!(
                "object '{id}' is already layered"
            )));
        }
        check_offset(id, offset)?;
        let members = self.layers.entry(layer).or_default();
        if members.len() >= LAYER_CAPACITY {
            return Err(ChoreoError::validation(format!(
                "layer '{}' is full ({LAYER_CAPACITY} objects)",
                layer.name()
            )));
        }
        members.push(Member {
            id: id.to_string(),
            offset,
        });
        self.index.insert(id.to_string(), layer);
        Ok(self.updates_from(layer, self.members_len(layer) - 1))
    }

    /// Remove `id`. Members above it move down one slot.
    pub fn remove(&mut self, id: &str) -> ChoreoResult<Vec<DepthUpdate>> {
        let (layer, idx) = self.locate(id)?;
        self.index.remove(id);
        let members = self.layers.entry(layer).or_default();
        members.remove(idx);
        Ok(self.updates_from(layer, idx))
    }

    /// Move `id` to the top of its layer.
    pub fn move_to_front(&mut self, id: &str) -> ChoreoResult<Vec<DepthUpdate>> {
        let (layer, idx) = self.locate(id)?;
        let members = self.layers.entry(layer).or_default();
        let m = members.remove(idx);
        members.push(m);
        Ok(self.updates_from(layer, idx))
    }

    /// Move `id` to the bottom of its layer.
    pub fn move_to_back(&mut self, id: &str) -> ChoreoResult<Vec<DepthUpdate>> {
        let (layer, idx) = self.locate(id)?;
        let members = self.layers.entry(layer).or_default();
        let m = members.remove(idx);
        members.insert(0, m);
        Ok(self.updates_range(layer, 0, idx + 1))
    }

    /// Nudge `id` within its slot by `offset` (`|offset| <= MAX_OFFSET`).
    pub fn set_offset(&mut self, id: &str, offset: i64) -> ChoreoResult<Vec<DepthUpdate>> {
        check_offset(id, offset)?;
        let (layer, idx) = self.locate(id)?;
        let members = self.layers.entry(layer).or_default();
        members[idx].offset = offset;
        Ok(self.updates_range(layer, idx, idx + 1))
    }

    /// Move `id` to the front of another layer. The offset is kept.
    pub fn move_to_layer(&mut self, id: &str, to: SemanticLayer) -> ChoreoResult<Vec<DepthUpdate>> {
        let (from, idx) = self.locate(id)?;
        if from == to {
            return Ok(Vec::new());
        }
        let target_len = self.members_len(to);
        if target_len >= LAYER_CAPACITY {
            return Err(ChoreoError::validation(format!(
                "layer '{}' is full ({LAYER_CAPACITY} objects)",
                to.name()
            )));
        }
        let m = self.layers.entry(from).or_default().remove(idx);
        self.layers.entry(to).or_default().push(m);
        self.index.insert(id.to_string(), to);
        let mut updates = self.updates_from(from, idx);
        updates.extend(self.updates_from(to, target_len));
        Ok(updates)
    }

    /// Current depth of `id`.
    pub fn depth_of(&self, id: &str) -> Option<i64> {
        let (layer, idx) = self.locate(id).ok()?;
        self.layers
            .get(&layer)
            .map(|members| depth(layer, idx, members[idx].offset))
    }

    /// Semantic layer of `id`.
    pub fn layer_of(&self, id: &str) -> Option<SemanticLayer> {
        self.index.get(id).copied()
    }

    /// Member ids of `layer`, back to front.
    pub fn members(&self, layer: SemanticLayer) -> Vec<&str> {
        self.layers
            .get(&layer)
            .map(|m| m.iter().map(|m| m.id.as_str()).collect())
            .unwrap_or_default()
    }

    /// Every object with its depth, back to front.
    pub fn draw_order(&self) -> Vec<(&str, i64)> {
        self.layers
            .iter()
            .flat_map(|(layer, members)| {
                members
                    .iter()
                    .enumerate()
                    .map(move |(i, m)| (m.id.as_str(), depth(*layer, i, m.offset)))
            })
            .collect()
    }

    fn locate(&self, id: &str) -> ChoreoResult<(SemanticLayer, usize)> {
        let layer = *self
            .index
            .get(id)
            .ok_or_else(|| ChoreoError::validation(format!("object '{id}' is not layered")))?;
        let idx = self
            .layers
            .get(&layer)
            .and_then(|m| m.iter().position(|m| m.id == id))
            .ok_or_else(|| ChoreoError::validation(format!("object '{id}' is not layered")))?;
        Ok((layer, idx))
    }

    fn members_len(&self, layer: SemanticLayer) -> usize {
        self.layers.get(&layer).map_or(0, Vec::len)
    }

    fn updates_from(&self, layer: SemanticLayer, start: usize) -> Vec<DepthUpdate> {
        self.updates_range(layer, start, self.members_len(layer))
    }

    fn updates_range(&self, layer: SemanticLayer, start: usize, end: usize) -> Vec<DepthUpdate> {
        let Some(members) = self.layers.get(&layer) else {
            return Vec::new();
        };
        let end = end.min(members.len());
        (start.min(end)..end)
            .map(|i| DepthUpdate {
                id: members[i].id.clone(),
                depth: depth(layer, i, members[i].offset),
            })
            .collect()
    }
}

fn depth(layer: SemanticLayer, idx: usize, offset: i64) -> i64 {
    layer.base_depth() + idx as i64 * DEPTH_SPACING + offset
}

fn check_offset(id: &str, offset: i64) -> ChoreoResult<()> {
    if !(-MAX_OFFSET..=MAX_OFFSET).contains(&offset) {
        return Err(ChoreoError::validation(format!(
            "z offset {offset} of '{id}' is outside [-{MAX_OFFSET}, {MAX_OFFSET}]"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/layering/depth.rs"]
mod tests;
