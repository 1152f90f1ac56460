use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 卡片条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
}

impl Item {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
        }
    }
}

/// 看板列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
}

impl Column {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
        }
    }
}

/// 挂在列上的小标签容器
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniContainer {
    pub id: String,
    pub name: String,
}

impl MiniContainer {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
        }
    }
}

/// 条目的归属：某个具名列，或者未分配池
///
/// 池不占用列的 id 空间，所以用户建的列不会和它撞名。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerRef {
    Named(String),
    Pool,
}

impl ContainerRef {
    pub fn column_id(&self) -> Option<&str> {
        match self {
            ContainerRef::Named(id) => Some(id),
            ContainerRef::Pool => None,
        }
    }
}

/// 拖拽主体，在 begin_drag 时解析一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSubject {
    Item {
        container: ContainerRef,
        item_id: String,
    },
    Column {
        column_id: String,
    },
}

impl DragSubject {
    pub fn id(&self) -> &str {
        match self {
            DragSubject::Item { item_id, .. } => item_id,
            DragSubject::Column { column_id } => column_id,
        }
    }
}

/// 光标悬停的目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Container(ContainerRef),
    Item(String),
}

/// db.json：列的顺序、名字和成员
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainersDoc {
    #[serde(default)]
    pub containers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub container_order: Vec<String>,
    #[serde(default)]
    pub container_names: BTreeMap<String, String>,
    #[serde(default)]
    pub pool: Vec<String>,
}

/// items-db.json 中未分配池使用的键
pub const POOL_KEY: &str = "pool";

/// items-db.json：按容器分组的条目，键是列 ID 或 [`POOL_KEY`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemsDoc {
    #[serde(default)]
    pub items: BTreeMap<String, Vec<Item>>,
}

/// mini-db.json：每列的小标签名字
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniDoc {
    #[serde(default)]
    pub mini_containers: BTreeMap<String, Vec<String>>,
}

/// 把 `from` 处的元素挪到 `to`，中间的元素顺移
pub fn array_move<T>(list: &mut Vec<T>, from: usize, to: usize) {
    if from >= list.len() || from == to {
        return;
    }
    let element = list.remove(from);
    let to = to.min(list.len());
    list.insert(to, element);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_move_forward() {
        let mut list = vec!["A", "B", "C", "D"];
        array_move(&mut list, 0, 2);
        assert_eq!(list, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn test_array_move_backward() {
        let mut list = vec!["A", "B", "C", "D"];
        array_move(&mut list, 3, 1);
        assert_eq!(list, vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn test_array_move_clamps_and_ignores_bad_index() {
        let mut list = vec![1, 2, 3];
        array_move(&mut list, 0, 10);
        assert_eq!(list, vec![2, 3, 1]);

        array_move(&mut list, 5, 0);
        assert_eq!(list, vec![2, 3, 1]);
    }

    #[test]
    fn test_new_ids_are_unique() {
        let a = Item::new("a".to_string());
        let b = Item::new("a".to_string());
        assert_ne!(a.id, b.id);
        assert_ne!(Column::new("x".into()).id, Column::new("x".into()).id);
    }

    #[test]
    fn test_containers_doc_uses_camel_case_keys() {
        let doc = ContainersDoc {
            container_order: vec!["a".into()],
            ..Default::default()
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"containerOrder\""));
        assert!(json.contains("\"containerNames\""));

        let mini = serde_json::to_string(&MiniDoc::default()).unwrap();
        assert_eq!(mini, r#"{"miniContainers":{}}"#);
    }

    #[test]
    fn test_missing_fields_default() {
        let doc: ContainersDoc = serde_json::from_str(r#"{"containerOrder":["x"]}"#).unwrap();
        assert_eq!(doc.container_order, vec!["x".to_string()]);
        assert!(doc.containers.is_empty());
        assert!(doc.pool.is_empty());
    }

    #[test]
    fn test_items_and_minis_grouped_by_container() {
        let items: ItemsDoc =
            serde_json::from_str(r#"{"items":{"A":[{"id":"i1","name":"Motor"}],"pool":[]}}"#)
                .unwrap();
        assert_eq!(items.items["A"][0].name, "Motor");
        assert!(items.items[POOL_KEY].is_empty());

        let minis: MiniDoc = serde_json::from_str(r#"{"miniContainers":{"A":["m1","m2"]}}"#).unwrap();
        assert_eq!(minis.mini_containers["A"], vec!["m1", "m2"]);
    }
}
