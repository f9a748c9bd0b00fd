/// Canonical slot layout derived from the position map.
///
/// The declared order of the posmap is the slot order: a posmap of
/// `DST:1,QB:1,RB:2` lays out slots `[DST, QB, RB, RB]`. Slot `c` is
/// permanently tied to the position view at `view_of_slot[c]`, which is the
/// invariant the column-aligned crossover and per-slot mutation rely on.
#[derive(Debug, Clone)]
pub struct SlotLayout {
    view_of_slot: Vec<usize>,
    groups: Vec<(usize, usize)>,
    slot_names: Vec<String>,
}

impl SlotLayout {
    pub fn build(posmap: &[(String, usize)]) -> Self {
        let mut view_of_slot = Vec::new();
        let mut groups = Vec::new();
        let mut slot_names = Vec::new();
        for (view_idx, (name, count)) in posmap.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            groups.push((view_idx, *count));
            for _ in 0..*count {
                view_of_slot.push(view_idx);
                slot_names.push(name.clone());
            }
        }
        Self {
            view_of_slot,
            groups,
            slot_names,
        }
    }

    /// Total slots per lineup.
    pub fn len(&self) -> usize {
        self.view_of_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view_of_slot.is_empty()
    }

    pub fn view_of_slot(&self, slot: usize) -> usize {
        self.view_of_slot[slot]
    }

    /// Consecutive (view index, slot count) runs, in slot order.
    pub fn groups(&self) -> &[(usize, usize)] {
        &self.groups
    }

    pub fn slot_name(&self, slot: usize) -> &str {
        &self.slot_names[slot]
    }

    /// Slot indices occupied by FLEX.
    pub fn flex_slots(&self) -> Vec<usize> {
        self.slot_names
            .iter()
            .enumerate()
            .filter(|(_, n)| n.as_str() == "FLEX")
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_declared_order() {
        let posmap = vec![
            ("DST".to_string(), 1),
            ("QB".to_string(), 1),
            ("RB".to_string(), 2),
            ("FLEX".to_string(), 1),
        ];
        let layout = SlotLayout::build(&posmap);
        assert_eq!(layout.len(), 5);
        assert_eq!(layout.slot_name(0), "DST");
        assert_eq!(layout.slot_name(2), "RB");
        assert_eq!(layout.slot_name(3), "RB");
        assert_eq!(layout.view_of_slot(4), 3);
        assert_eq!(layout.flex_slots(), vec![4]);
    }

    #[test]
    fn zero_count_entries_occupy_no_slots() {
        let posmap = vec![("QB".to_string(), 1), ("FLEX".to_string(), 0)];
        let layout = SlotLayout::build(&posmap);
        assert_eq!(layout.len(), 1);
        assert!(layout.flex_slots().is_empty());
    }
}
