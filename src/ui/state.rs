//! App 状态定义 (Model)
//!
//! 包含应用状态结构体及相关枚举

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::board::{Board, ColumnDeletePolicy};
use crate::config::Config;
use crate::models::{ContainerRef, DropTarget, Item};
use crate::storage::JsonStore;

/// 应用状态
pub struct App {
    pub board: Board,
    pub store: JsonStore,
    pub delete_policy: ColumnDeletePolicy,
    pub autosave_delay: Option<Duration>,
    pub focused_holder: usize, // board.holders() 中的下标，池在最后
    pub selected_index: usize, // 拖拽时表示落点
    pub mode: AppMode,
    pub input_buffer: String,
    pub message: Option<String>,
    pub last_saved: Option<DateTime<Local>>,
    pub pending_since: Option<Instant>, // 最近一次未保存改动的时间
}

/// 应用模式
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    AddingItem(ContainerRef),
    AddingColumn,
    AddingMini(String), // 列 ID
    RemovingMini { column_id: String, index: usize },
    DraggingItem,
    DraggingColumn,
    Confirm(ConfirmAction),
}

/// 确认操作类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    DeleteItem(String),
    DeleteColumn(String),
}

impl App {
    /// 创建新的应用实例
    pub fn new(board: Board, store: JsonStore, config: &Config) -> Self {
        let mut app = Self {
            board,
            store,
            delete_policy: config.on_column_delete,
            autosave_delay: config.autosave_delay(),
            focused_holder: 0,
            selected_index: 0,
            mode: AppMode::Normal,
            input_buffer: String::new(),
            message: None,
            last_saved: None,
            pending_since: None,
        };
        app.clamp_selection();
        app
    }

    /// 当前聚焦的容器
    pub fn focused_container(&self) -> ContainerRef {
        self.board
            .holders()
            .get(self.focused_holder)
            .cloned()
            .unwrap_or(ContainerRef::Pool)
    }

    pub fn focused_items(&self) -> &[Item] {
        self.board.items_in(&self.focused_container())
    }

    /// 获取当前选中的条目
    pub fn selected_item(&self) -> Option<&Item> {
        self.focused_items().get(self.selected_index)
    }

    /// 光标所指的落点：有条目就是条目，否则是容器本身
    pub fn hover_target(&self) -> DropTarget {
        match self.selected_item() {
            Some(item) => DropTarget::Item(item.id.clone()),
            None => DropTarget::Container(self.focused_container()),
        }
    }

    /// 确保聚焦和选中下标有效
    pub fn clamp_selection(&mut self) {
        let holders = self.board.holders().len();
        if self.focused_holder >= holders {
            self.focused_holder = holders - 1;
        }
        let len = self.focused_items().len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    /// 把焦点移到条目所在位置
    pub fn focus_item(&mut self, item_id: &str) {
        if let Some((container, index)) = self.board.locate(item_id) {
            self.focused_holder = match &container {
                ContainerRef::Named(id) => self.board.column_index(id).unwrap_or(0),
                ContainerRef::Pool => self.board.columns().len(),
            };
            self.selected_index = index;
        }
        self.clamp_selection();
    }

    pub fn focus_column(&mut self, column_id: &str) {
        if let Some(index) = self.board.column_index(column_id) {
            self.focused_holder = index;
        }
        self.clamp_selection();
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, AppMode::DraggingItem | AppMode::DraggingColumn)
    }
}
