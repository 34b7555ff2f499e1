// ==========================================
// 记录型事件发布者 - 用于集成测试
// ==========================================

use greenhouse_forecast::engine::{ActionEvent, ActionEventPublisher, ActionEventType};
use std::error::Error;
use std::sync::Mutex;

/// 按发布顺序保存全部事件
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<ActionEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ActionEvent> {
        self.events.lock().unwrap().clone()
    }

    /// 某作业的事件类型序列
    pub fn types_for(&self, action_id: &str) -> Vec<ActionEventType> {
        self.events()
            .into_iter()
            .filter(|e| e.action_id == action_id)
            .map(|e| e.event_type)
            .collect()
    }
}

impl ActionEventPublisher for RecordingPublisher {
    fn publish(&self, event: ActionEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        let id = format!("{}-{}", event.action_id, event.event_type.as_str());
        self.events.lock().unwrap().push(event);
        Ok(id)
    }
}
