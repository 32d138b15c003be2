//! 路线规划会话：出发地、出行方式和访问项的勾选状态

use crate::coords::Coordinate;
use crate::routing::TravelProfile;
use crate::visit_list::{ItemId, VisitItem};
use std::collections::HashSet;

/// 访问项默认全部勾选，只记录被取消勾选的 ID
#[derive(Debug, Clone)]
pub struct PlannerSession {
    pub origin: Coordinate,
    pub profile: TravelProfile,
    excluded: HashSet<ItemId>,
}

impl PlannerSession {
    pub fn new(origin: Coordinate, profile: TravelProfile) -> Self {
        Self {
            origin,
            profile,
            excluded: HashSet::new(),
        }
    }

    pub fn set_profile(&mut self, profile: TravelProfile) {
        self.profile = profile;
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        !self.excluded.contains(id)
    }

    pub fn set_selected(&mut self, id: &ItemId, selected: bool) {
        if selected {
            self.excluded.remove(id);
        } else {
            self.excluded.insert(id.clone());
        }
    }

    pub fn toggle(&mut self, id: &ItemId) {
        let selected = self.is_selected(id);
        self.set_selected(id, !selected);
    }

    /// 全部已勾选时取消全部，否则勾选全部
    pub fn toggle_select_all(&mut self, list: &[VisitItem]) {
        let all_selected = list.iter().all(|item| self.is_selected(&item.id));
        if all_selected {
            self.excluded.extend(list.iter().map(|item| item.id.clone()));
        } else {
            self.excluded.clear();
        }
    }

    /// 按列表顺序返回已勾选的访问项
    pub fn selected_items(&self, list: &[VisitItem]) -> Vec<VisitItem> {
        list.iter()
            .filter(|item| self.is_selected(&item.id))
            .cloned()
            .collect()
    }
}
