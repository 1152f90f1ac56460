//! 看板状态机
//!
//! 持有列、各列条目、未分配池以及当前拖拽，响应 begin / over / end 三个拖拽信号。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{
    Column, ContainerRef, ContainersDoc, DragSubject, DropTarget, Item, ItemsDoc, MiniContainer,
    MiniDoc, POOL_KEY, array_move,
};

/// 删除列时列内条目的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDeletePolicy {
    #[default]
    ToPool,
    Discard,
}

/// 运行时看板
#[derive(Debug, Clone, Default)]
pub struct Board {
    columns: Vec<Column>,
    items_by_column: HashMap<String, Vec<Item>>,
    pool: Vec<Item>,
    minis: HashMap<String, Vec<MiniContainer>>,
    active_drag: Option<DragSubject>,
    revision: u64,
    pub dirty: bool,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    // ============ 读取 ============

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> &[Item] {
        &self.pool
    }

    pub fn items_in(&self, container: &ContainerRef) -> &[Item] {
        self.holder(container).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn minis_of(&self, column_id: &str) -> &[MiniContainer] {
        self.minis.get(column_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 每次改动集合都会递增
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.dirty = true;
    }

    pub fn active_drag(&self) -> Option<&DragSubject> {
        self.active_drag.as_ref()
    }

    /// 所有容器：先按顺序列出各列，池排在最后
    pub fn holders(&self) -> Vec<ContainerRef> {
        self.columns
            .iter()
            .map(|c| ContainerRef::Named(c.id.clone()))
            .chain(std::iter::once(ContainerRef::Pool))
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.pool.len() + self.items_by_column.values().map(Vec::len).sum::<usize>()
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    pub fn has_column(&self, column_id: &str) -> bool {
        self.column_index(column_id).is_some()
    }

    /// 线性扫描，找出条目所在的容器和下标
    pub fn locate(&self, item_id: &str) -> Option<(ContainerRef, usize)> {
        if let Some(index) = self.pool.iter().position(|i| i.id == item_id) {
            return Some((ContainerRef::Pool, index));
        }
        self.columns.iter().find_map(|column| {
            self.items_by_column
                .get(&column.id)
                .and_then(|items| items.iter().position(|i| i.id == item_id))
                .map(|index| (ContainerRef::Named(column.id.clone()), index))
        })
    }

    fn holder(&self, container: &ContainerRef) -> Option<&Vec<Item>> {
        match container {
            ContainerRef::Pool => Some(&self.pool),
            ContainerRef::Named(id) => self.items_by_column.get(id),
        }
    }

    fn holder_mut(&mut self, container: &ContainerRef) -> Option<&mut Vec<Item>> {
        match container {
            ContainerRef::Pool => Some(&mut self.pool),
            ContainerRef::Named(id) => self.items_by_column.get_mut(id),
        }
    }

    /// 把悬停目标解析成具体容器；悬停在条目上时附带该条目的下标
    fn resolve(&self, target: &DropTarget) -> Option<(ContainerRef, Option<usize>)> {
        match target {
            DropTarget::Container(ContainerRef::Pool) => Some((ContainerRef::Pool, None)),
            DropTarget::Container(ContainerRef::Named(id)) => self
                .has_column(id)
                .then(|| (ContainerRef::Named(id.clone()), None)),
            DropTarget::Item(id) => self.locate(id).map(|(c, index)| (c, Some(index))),
        }
    }

    // ============ 列 / 条目 的增删 ============

    /// 添加新列，名字为空时不做任何事
    pub fn add_column(&mut self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let column = Column::new(name.to_string());
        let id = column.id.clone();
        self.items_by_column.insert(id.clone(), Vec::new());
        self.columns.push(column);
        self.touch();
        info!(column_id = %id, name, "column added");
        Some(id)
    }

    /// 删除列，列内条目按策略移入池或丢弃
    pub fn remove_column(&mut self, column_id: &str, policy: ColumnDeletePolicy) -> Option<Column> {
        let index = self.column_index(column_id)?;
        let column = self.columns.remove(index);
        let items = self.items_by_column.remove(column_id).unwrap_or_default();
        self.minis.remove(column_id);

        let count = items.len();
        if policy == ColumnDeletePolicy::ToPool {
            self.pool.extend(items);
        }

        let involved = match &self.active_drag {
            Some(DragSubject::Column { column_id: id }) => id == column_id,
            Some(DragSubject::Item { container, .. }) => container.column_id() == Some(column_id),
            None => false,
        };
        if involved {
            self.active_drag = None;
        }

        self.touch();
        info!(column_id, items = count, ?policy, "column removed");
        Some(column)
    }

    /// 添加条目到指定容器
    pub fn add_item(&mut self, name: &str, into: &ContainerRef) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let item = Item::new(name.to_string());
        let id = item.id.clone();
        self.holder_mut(into)?.push(item);
        self.touch();
        info!(item_id = %id, name, container = ?into, "item added");
        Some(id)
    }

    pub fn add_pool_item(&mut self, name: &str) -> Option<String> {
        self.add_item(name, &ContainerRef::Pool)
    }

    /// 从所在容器中删除条目
    pub fn remove_item(&mut self, item_id: &str) -> Option<Item> {
        let (container, index) = self.locate(item_id)?;
        let item = self.holder_mut(&container)?.remove(index);
        if matches!(&self.active_drag, Some(DragSubject::Item { item_id: id, .. }) if id == item_id)
        {
            self.active_drag = None;
        }
        self.touch();
        info!(item_id, "item removed");
        Some(item)
    }

    pub fn add_mini(&mut self, column_id: &str, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() || !self.has_column(column_id) {
            return None;
        }
        let mini = MiniContainer::new(name.to_string());
        let id = mini.id.clone();
        self.minis.entry(column_id.to_string()).or_default().push(mini);
        self.touch();
        Some(id)
    }

    pub fn remove_mini(&mut self, mini_id: &str) -> Option<MiniContainer> {
        let list = self
            .minis
            .values_mut()
            .find(|list| list.iter().any(|m| m.id == mini_id))?;
        let index = list.iter().position(|m| m.id == mini_id)?;
        let mini = list.remove(index);
        self.touch();
        Some(mini)
    }

    // ============ 拖拽 ============

    /// 开始拖拽；id 是列就拖列，否则按条目处理。找不到时什么都不做
    pub fn begin_drag(&mut self, id: &str) -> Option<DragSubject> {
        let subject = if self.has_column(id) {
            DragSubject::Column {
                column_id: id.to_string(),
            }
        } else {
            let (container, _) = self.locate(id)?;
            DragSubject::Item {
                container,
                item_id: id.to_string(),
            }
        };
        debug!(?subject, "drag started");
        self.active_drag = Some(subject.clone());
        Some(subject)
    }

    /// 拖拽经过某个目标。目标容器与当前容器不同时立即移动条目（实时预览）
    pub fn drag_over(&mut self, target: &DropTarget) -> bool {
        let Some(DragSubject::Item { container, item_id }) = self.active_drag.clone() else {
            return false;
        };
        let Some((to, index)) = self.resolve(target) else {
            return false;
        };
        if container == to || !self.move_between(&item_id, &container, &to, index) {
            return false;
        }

        debug!(item_id = %item_id, from = ?container, to = ?to, "item moved on hover");
        self.active_drag = Some(DragSubject::Item {
            container: to,
            item_id,
        });
        self.touch();
        true
    }

    /// 结束拖拽。无论目标是否有效都会清掉当前拖拽；目标缺失时不改动任何集合
    pub fn end_drag(&mut self, target: Option<&DropTarget>) -> bool {
        let Some(subject) = self.active_drag.take() else {
            return false;
        };
        let Some(target) = target else {
            debug!(?subject, "drag cancelled");
            return false;
        };

        let changed = match &subject {
            DragSubject::Item { container, item_id } => self.drop_item(container, item_id, target),
            DragSubject::Column { column_id } => self.drop_column(column_id, target),
        };
        if changed {
            self.touch();
        }
        debug!(?subject, changed, "drag ended");
        changed
    }

    fn drop_item(&mut self, from: &ContainerRef, item_id: &str, target: &DropTarget) -> bool {
        let Some((to, index)) = self.resolve(target) else {
            return false;
        };
        if *from != to {
            return self.move_between(item_id, from, &to, index);
        }

        let Some(items) = self.holder_mut(from) else {
            return false;
        };
        let Some(position) = items.iter().position(|i| i.id == item_id) else {
            return false;
        };
        let destination = index.unwrap_or(items.len() - 1);
        if position == destination {
            return false;
        }
        array_move(items, position, destination);
        true
    }

    fn drop_column(&mut self, column_id: &str, target: &DropTarget) -> bool {
        let Some((ContainerRef::Named(to_id), _)) = self.resolve(target) else {
            return false;
        };
        let (Some(from), Some(to)) = (self.column_index(column_id), self.column_index(&to_id))
        else {
            return false;
        };
        if from == to {
            return false;
        }
        array_move(&mut self.columns, from, to);
        true
    }

    /// 从 `from` 取出条目放进 `to`：给了下标就插在该处，否则追加到末尾
    fn move_between(
        &mut self,
        item_id: &str,
        from: &ContainerRef,
        to: &ContainerRef,
        index: Option<usize>,
    ) -> bool {
        if self.holder(to).is_none() {
            return false;
        }
        let Some(source) = self.holder_mut(from) else {
            return false;
        };
        let Some(position) = source.iter().position(|i| i.id == item_id) else {
            return false;
        };
        let item = source.remove(position);

        if let Some(target) = self.holder_mut(to) {
            let at = index.unwrap_or(target.len()).min(target.len());
            target.insert(at, item);
        }
        true
    }

    // ============ 持久化文档转换 ============

    /// 从三份文档重建看板，顺带修复彼此不一致的地方
    /// 从三份文档重建看板；修补过不一致的内容时标记为 dirty
    pub fn from_documents(containers: ContainersDoc, items: ItemsDoc, minis: MiniDoc) -> Self {
        let mut catalog = Catalog::new(items);
        let mut board = Self::new();
        let mut repaired = catalog.duplicates > 0;

        for column_id in containers.container_order {
            if board.has_column(&column_id) {
                warn!(column_id = %column_id, "duplicate column in containerOrder skipped");
                repaired = true;
                continue;
            }
            let name = containers
                .container_names
                .get(&column_id)
                .cloned()
                .unwrap_or_else(|| column_id.clone());
            let placed = containers
                .containers
                .get(&column_id)
                .map(|ids| catalog.take(ids))
                .unwrap_or_default();
            board.items_by_column.insert(column_id.clone(), placed);
            board.columns.push(Column {
                id: column_id,
                name,
            });
        }

        board.pool = catalog.take(&containers.pool);
        repaired |= catalog.missing > 0;

        // 目录里有、但没被放到任何地方的条目：回到分组所属的列，否则进池
        let leftovers = catalog.into_leftovers();
        if !leftovers.is_empty() {
            warn!(count = leftovers.len(), "unplaced items restored");
            repaired = true;
        }
        for (key, item) in leftovers {
            match board.items_by_column.get_mut(&key) {
                Some(list) => list.push(item),
                None => board.pool.push(item),
            }
        }

        for (column_id, names) in minis.mini_containers {
            if board.has_column(&column_id) {
                let list = names.into_iter().map(MiniContainer::new).collect();
                board.minis.insert(column_id, list);
            } else {
                warn!(column_id = %column_id, "mini containers of unknown column dropped");
                repaired = true;
            }
        }

        board.dirty = repaired;
        board
    }

    pub fn to_documents(&self) -> (ContainersDoc, ItemsDoc, MiniDoc) {
        let mut containers = ContainersDoc::default();
        let mut items = ItemsDoc::default();
        let mut minis = MiniDoc::default();

        for column in &self.columns {
            let list = self.items_in(&ContainerRef::Named(column.id.clone()));
            containers
                .containers
                .insert(column.id.clone(), list.iter().map(|i| i.id.clone()).collect());
            containers.container_order.push(column.id.clone());
            containers
                .container_names
                .insert(column.id.clone(), column.name.clone());
            items.items.insert(column.id.clone(), list.to_vec());

            let column_minis = self.minis_of(&column.id);
            if !column_minis.is_empty() {
                minis.mini_containers.insert(
                    column.id.clone(),
                    column_minis.iter().map(|m| m.name.clone()).collect(),
                );
            }
        }

        containers.pool = self.pool.iter().map(|i| i.id.clone()).collect();
        items.items.insert(POOL_KEY.to_string(), self.pool.clone());

        (containers, items, minis)
    }
}

/// items-db.json 的内容按 id 建索引，记住每个条目原来所在的分组
struct Catalog {
    entries: HashMap<String, (String, Item)>,
    order: Vec<String>,
    duplicates: usize,
    missing: usize,
}

impl Catalog {
    fn new(doc: ItemsDoc) -> Self {
        let mut catalog = Self {
            entries: HashMap::new(),
            order: Vec::new(),
            duplicates: 0,
            missing: 0,
        };
        for (key, list) in doc.items {
            for item in list {
                if catalog.entries.contains_key(&item.id) {
                    warn!(item_id = %item.id, "duplicate item in items document skipped");
                    catalog.duplicates += 1;
                    continue;
                }
                catalog.order.push(item.id.clone());
                catalog.entries.insert(item.id.clone(), (key.clone(), item));
            }
        }
        catalog
    }

    /// 按 id 顺序取出条目；未知 id 忽略，重复 id 只保留第一次
    fn take(&mut self, ids: &[String]) -> Vec<Item> {
        ids.iter()
            .filter_map(|id| match self.entries.remove(id) {
                Some((_, item)) => Some(item),
                None => {
                    warn!(item_id = %id, "unknown or repeated item id dropped");
                    self.missing += 1;
                    None
                }
            })
            .collect()
    }

    /// 剩下的 (分组键, 条目)，保持文档中的顺序
    fn into_leftovers(mut self) -> Vec<(String, Item)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.remove(id))
            .collect()
    }
}
