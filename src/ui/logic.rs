//! 业务逻辑处理 (Update/Dispatch)
//!
//! 包含核心的 dispatch 逻辑和各种业务处理方法

use std::time::Instant;

use chrono::Local;
use tracing::error;

use super::actions::Action;
use super::state::{App, AppMode, ConfirmAction};
use crate::models::{ContainerRef, DragSubject};
use crate::storage::save_board;

impl App {
    /// 核心逻辑分发，返回是否退出
    pub fn dispatch(&mut self, action: Action) -> bool {
        let revision = self.board.revision();

        match action {
            Action::Quit => return true,
            Action::FocusLeft => match self.mode {
                AppMode::RemovingMini { .. } => self.select_mini(false),
                _ => self.focus_left(),
            },
            Action::FocusRight => match self.mode {
                AppMode::RemovingMini { .. } => self.select_mini(true),
                _ => self.focus_right(),
            },
            Action::MoveSelectionUp => self.move_up(),
            Action::MoveSelectionDown => self.move_down(),

            Action::StartAddItem => self.start_input(AppMode::AddingItem(self.focused_container())),
            Action::StartAddColumn => self.start_input(AppMode::AddingColumn),
            Action::StartAddMini => {
                if let ContainerRef::Named(id) = self.focused_container() {
                    self.start_input(AppMode::AddingMini(id));
                }
            }
            Action::StartRemoveMini => self.start_remove_mini(),
            Action::LiftItem => self.lift_item(),
            Action::LiftColumn => self.lift_column(),
            Action::StartDeleteItem => self.start_delete_item(),
            Action::StartDeleteColumn => self.start_delete_column(),
            Action::Save => self.save(),

            Action::Cancel => self.cancel(),

            Action::Submit => match self.mode.clone() {
                AppMode::AddingItem(container) => self.confirm_add_item(&container),
                AppMode::AddingColumn => self.confirm_add_column(),
                AppMode::AddingMini(column_id) => self.confirm_add_mini(&column_id),
                AppMode::DraggingItem => self.drop_item(),
                AppMode::DraggingColumn => self.drop_column(),
                AppMode::RemovingMini { column_id, index } => {
                    self.confirm_remove_mini(&column_id, index)
                }
                AppMode::Confirm(_) => self.execute_confirm(),
                AppMode::Normal => {}
            },

            Action::Input(c) => {
                if self.is_editing() {
                    self.input_buffer.push(c);
                }
            }

            Action::DeleteChar => {
                if self.is_editing() {
                    self.input_buffer.pop();
                }
            }
        }

        if self.board.revision() != revision {
            self.pending_since = Some(Instant::now());
        }
        false
    }

    fn is_editing(&self) -> bool {
        matches!(
            self.mode,
            AppMode::AddingItem(_) | AppMode::AddingColumn | AppMode::AddingMini(_)
        )
    }

    // ============ 导航相关 ============

    /// 焦点左移；拖拽条目时同时触发 drag_over
    pub fn focus_left(&mut self) {
        if self.focused_holder > 0 {
            self.focused_holder -= 1;
            self.after_focus_change();
        }
    }

    pub fn focus_right(&mut self) {
        // 拖列时不能移到池上
        let last = match self.mode {
            AppMode::DraggingColumn => self.board.columns().len().saturating_sub(1),
            _ => self.board.columns().len(),
        };
        if self.focused_holder < last {
            self.focused_holder += 1;
            self.after_focus_change();
        }
    }

    fn after_focus_change(&mut self) {
        self.clamp_selection();
        if self.mode == AppMode::DraggingItem {
            self.hover();
        }
    }

    /// 向上移动选择
    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            if self.mode == AppMode::DraggingItem {
                self.hover();
            }
        }
    }

    /// 向下移动选择
    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.focused_items().len() {
            self.selected_index += 1;
            if self.mode == AppMode::DraggingItem {
                self.hover();
            }
        }
    }

    // ============ 拖拽相关 ============

    fn dragged_id(&self) -> Option<String> {
        self.board.active_drag().map(|s| s.id().to_string())
    }

    /// 拿起当前选中的条目
    pub fn lift_item(&mut self) {
        let Some(id) = self.selected_item().map(|i| i.id.clone()) else {
            return;
        };
        if self.board.begin_drag(&id).is_some() {
            self.mode = AppMode::DraggingItem;
            self.message = Some("拖拽中：[h/l] 换列  [j/k] 选择落点  [space] 放下".to_string());
        }
    }

    /// 拿起当前聚焦的列
    pub fn lift_column(&mut self) {
        let ContainerRef::Named(id) = self.focused_container() else {
            return;
        };
        if self.board.begin_drag(&id).is_some() {
            self.mode = AppMode::DraggingColumn;
            self.message = Some("移动列：[h/l] 选择位置  [space] 放下".to_string());
        }
    }

    /// 光标移到新位置：跨容器时条目立即跟过去
    fn hover(&mut self) {
        let target = self.hover_target();
        if self.board.drag_over(&target) {
            if let Some(id) = self.dragged_id() {
                self.focus_item(&id);
            }
        }
    }

    pub fn drop_item(&mut self) {
        let dragged = self.dragged_id();
        let target = self.hover_target();
        let changed = self.board.end_drag(Some(&target));
        if let Some(id) = dragged {
            self.focus_item(&id);
        }
        self.mode = AppMode::Normal;
        self.message = Some(if changed { "条目已放下" } else { "位置未变" }.to_string());
    }

    pub fn drop_column(&mut self) {
        let dragged = self.dragged_id();
        let target = self.hover_target();
        let changed = self.board.end_drag(Some(&target));
        if let Some(id) = dragged {
            self.focus_column(&id);
        }
        self.mode = AppMode::Normal;
        self.message = Some(if changed { "列已移动" } else { "位置未变" }.to_string());
    }

    // ============ 添加相关 ============

    fn start_input(&mut self, mode: AppMode) {
        self.mode = mode;
        self.input_buffer.clear();
    }

    /// 确认添加条目；名字为空时停留在输入框
    pub fn confirm_add_item(&mut self, container: &ContainerRef) {
        if self.input_buffer.trim().is_empty() {
            return;
        }
        let added = match container {
            ContainerRef::Pool => self.board.add_pool_item(&self.input_buffer),
            named => self.board.add_item(&self.input_buffer, named),
        };
        match added {
            Some(id) => {
                self.focus_item(&id);
                self.message = Some("条目已添加".to_string());
            }
            None => self.message = Some("目标列已不存在".to_string()),
        }
        self.finish_input();
    }

    pub fn confirm_add_column(&mut self) {
        if let Some(id) = self.board.add_column(&self.input_buffer) {
            self.focus_column(&id);
            self.message = Some("列已添加".to_string());
            self.finish_input();
        }
    }

    pub fn confirm_add_mini(&mut self, column_id: &str) {
        if self.input_buffer.trim().is_empty() {
            return;
        }
        if self.board.add_mini(column_id, &self.input_buffer).is_some() {
            self.message = Some("标签已添加".to_string());
        }
        self.finish_input();
    }

    fn finish_input(&mut self) {
        self.mode = AppMode::Normal;
        self.input_buffer.clear();
    }

    /// 进入标签选择，默认选中第一个
    pub fn start_remove_mini(&mut self) {
        let ContainerRef::Named(column_id) = self.focused_container() else {
            return;
        };
        if self.board.minis_of(&column_id).is_empty() {
            self.message = Some("该列没有标签".to_string());
            return;
        }
        self.mode = AppMode::RemovingMini {
            column_id,
            index: 0,
        };
    }

    fn select_mini(&mut self, forward: bool) {
        if let AppMode::RemovingMini { column_id, index } = &mut self.mode {
            let len = self.board.minis_of(column_id).len();
            if forward && *index + 1 < len {
                *index += 1;
            } else if !forward && *index > 0 {
                *index -= 1;
            }
        }
    }

    pub fn confirm_remove_mini(&mut self, column_id: &str, index: usize) {
        let mini_id = self.board.minis_of(column_id).get(index).map(|m| m.id.clone());
        if let Some(mini) = mini_id.and_then(|id| self.board.remove_mini(&id)) {
            self.message = Some(format!("已删除标签 {}", mini.name));
        }
        self.mode = AppMode::Normal;
    }

    // ============ 删除相关 ============

    pub fn start_delete_item(&mut self) {
        if let Some(id) = self.selected_item().map(|i| i.id.clone()) {
            self.mode = AppMode::Confirm(ConfirmAction::DeleteItem(id));
        }
    }

    pub fn start_delete_column(&mut self) {
        if let ContainerRef::Named(id) = self.focused_container() {
            self.mode = AppMode::Confirm(ConfirmAction::DeleteColumn(id));
        }
    }

    /// 执行确认操作
    pub fn execute_confirm(&mut self) {
        match &self.mode {
            AppMode::Confirm(ConfirmAction::DeleteItem(id)) => {
                let id = id.clone();
                if let Some(item) = self.board.remove_item(&id) {
                    self.message = Some(format!("已删除条目 {}", item.name));
                }
            }
            AppMode::Confirm(ConfirmAction::DeleteColumn(id)) => {
                let id = id.clone();
                if let Some(column) = self.board.remove_column(&id, self.delete_policy) {
                    self.message = Some(format!("已删除列 {}", column.name));
                }
            }
            _ => {}
        }
        self.clamp_selection();
        self.mode = AppMode::Normal;
    }

    // ============ 保存 ============

    /// 立即保存，结果显示在状态栏
    pub fn save(&mut self) {
        match save_board(&mut self.board, &self.store) {
            Ok(true) => {
                let now = Local::now();
                self.last_saved = Some(now);
                self.message = Some(format!("已保存 {}", now.format("%H:%M:%S")));
            }
            Ok(false) => self.message = Some("没有需要保存的改动".to_string()),
            Err(e) => {
                error!(error = %e, "save failed");
                self.message = Some(format!("保存失败: {e}"));
            }
        }
        self.pending_since = None;
    }

    /// 距最近一次改动超过延迟且不在拖拽中时自动保存
    pub fn autosave_due(&self, now: Instant) -> bool {
        match (self.autosave_delay, self.pending_since) {
            (Some(delay), Some(since)) => {
                self.board.dirty && !self.is_dragging() && now.duration_since(since) >= delay
            }
            _ => false,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if self.autosave_due(now) {
            self.save();
        }
    }

    // ============ 通用操作 ============

    /// 取消当前操作；拖拽中取消时不改动任何集合
    pub fn cancel(&mut self) {
        match self.mode {
            AppMode::DraggingItem | AppMode::DraggingColumn => {
                let dragged = self.board.active_drag().cloned();
                self.board.end_drag(None);
                match dragged {
                    Some(DragSubject::Item { item_id, .. }) => self.focus_item(&item_id),
                    Some(DragSubject::Column { column_id }) => self.focus_column(&column_id),
                    None => {}
                }
                self.message = Some("已取消拖拽".to_string());
            }
            _ => self.message = None,
        }
        self.mode = AppMode::Normal;
        self.input_buffer.clear();
    }
}
