// ==========================================
// 温室预测排程核心 - 作业优先级排序
// ==========================================
// 职责: 同一天内的作业排序
// 排序键: 紧急度降序 → 预计成本升序
// ==========================================

use crate::domain::action::Intervention;
use std::cmp::Ordering;

// ==========================================
// PrioritySorter - 作业排序器
// ==========================================
pub struct PrioritySorter {
    // 无状态引擎,不需要注入依赖
}

impl PrioritySorter {
    pub fn new() -> Self {
        Self {}
    }

    /// 排序作业列表 (稳定排序,同键保持推导顺序)
    pub fn sort(&self, mut actions: Vec<Intervention>) -> Vec<Intervention> {
        actions.sort_by(|a, b| self.compare(a, b));
        actions
    }

    /// 比较两个作业
    ///
    /// 1) urgency 降序 (critical > high > medium > low)
    /// 2) estimated_cost 升序 (低成本优先)
    pub fn compare(&self, a: &Intervention, b: &Intervention) -> Ordering {
        b.urgency
            .rank()
            .cmp(&a.urgency.rank())
            .then_with(|| a.estimated_cost.total_cmp(&b.estimated_cost))
    }

    /// 校验序列是否满足排序不变量
    pub fn is_sorted(&self, actions: &[Intervention]) -> bool {
        actions
            .windows(2)
            .all(|pair| self.compare(&pair[0], &pair[1]) != Ordering::Greater)
    }
}

impl Default for PrioritySorter {
    fn default() -> Self {
        Self::new()
    }
}
