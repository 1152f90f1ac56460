use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::board::Board;
use crate::error::StorageError;

/// 三份独立保存的 JSON 文档
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Containers,
    Items,
    MiniContainers,
}

impl Resource {
    pub fn file_name(self) -> &'static str {
        match self {
            Resource::Containers => "db.json",
            Resource::Items => "items-db.json",
            Resource::MiniContainers => "mini-db.json",
        }
    }
}

/// 整文件读写的 JSON 存储，没有合并也没有版本，后写覆盖先写
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, resource: Resource) -> PathBuf {
        self.dir.join(resource.file_name())
    }

    /// 读取整份文档；文件缺失、读取失败或解析失败都退回默认值
    pub fn read<T: DeserializeOwned + Default>(&self, resource: Resource) -> T {
        let path = self.path_of(resource);
        if !path.exists() {
            return T::default();
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "read failed, using empty document");
                return T::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "parse failed, using empty document");
            T::default()
        })
    }

    /// 覆盖写入整份文档
    pub fn write<T: Serialize>(&self, resource: Resource, doc: &T) -> Result<(), StorageError> {
        ensure_dir(&self.dir)?;
        let path = self.path_of(resource);
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&path, content).map_err(|source| StorageError::Write { path, source })
    }
}

pub fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// 从三份文档加载看板
pub fn load_board(store: &JsonStore) -> Board {
    let board = Board::from_documents(
        store.read(Resource::Containers),
        store.read(Resource::Items),
        store.read(Resource::MiniContainers),
    );
    info!(
        columns = board.columns().len(),
        items = board.item_count(),
        "board loaded"
    );
    board
}

/// 保存看板，没有改动时跳过。返回是否真正写了文件
pub fn save_board(board: &mut Board, store: &JsonStore) -> Result<bool, StorageError> {
    if !board.dirty {
        return Ok(false);
    }

    let (containers, items, minis) = board.to_documents();
    store.write(Resource::Containers, &containers)?;
    store.write(Resource::Items, &items)?;
    store.write(Resource::MiniContainers, &minis)?;

    board.dirty = false;
    info!(items = board.item_count(), "board saved");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContainerRef, ContainersDoc, ItemsDoc, MiniDoc};
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_file_returns_default() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let doc: ContainersDoc = store.read(Resource::Containers);
        assert_eq!(doc, ContainersDoc::default());
    }

    #[test]
    fn test_read_corrupt_file_returns_default() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        fs::write(store.path_of(Resource::Items), "{ not json").unwrap();
        let doc: ItemsDoc = store.read(Resource::Items);
        assert!(doc.items.is_empty());
    }

    #[test]
    fn test_read_unreadable_path_returns_default() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        fs::create_dir(store.path_of(Resource::Containers)).unwrap();
        let doc: ContainersDoc = store.read(Resource::Containers);
        assert_eq!(doc, ContainersDoc::default());
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested").join("data"));
        store
            .write(Resource::MiniContainers, &MiniDoc::default())
            .unwrap();
        let raw = fs::read_to_string(store.path_of(Resource::MiniContainers)).unwrap();
        assert!(raw.contains("miniContainers"));
    }

    #[test]
    fn test_write_failure_is_surfaced() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a dir").unwrap();
        let store = JsonStore::new(&blocker);
        let result = store.write(Resource::Containers, &ContainersDoc::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_write_of_read_is_byte_identical() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let mut board = Board::new();
        let column = board.add_column("Todo").unwrap();
        board.add_item("write notes", &ContainerRef::Named(column.clone()));
        board.add_pool_item("loose");
        board.add_mini(&column, "p1");
        save_board(&mut board, &store).unwrap();

        for resource in [Resource::Containers, Resource::Items, Resource::MiniContainers] {
            let before = fs::read(store.path_of(resource)).unwrap();
            match resource {
                Resource::Containers => {
                    let doc: ContainersDoc = store.read(resource);
                    store.write(resource, &doc).unwrap();
                }
                Resource::Items => {
                    let doc: ItemsDoc = store.read(resource);
                    store.write(resource, &doc).unwrap();
                }
                Resource::MiniContainers => {
                    let doc: MiniDoc = store.read(resource);
                    store.write(resource, &doc).unwrap();
                }
            }
            let after = fs::read(store.path_of(resource)).unwrap();
            assert_eq!(before, after, "{resource:?} changed on rewrite");
        }
    }

    #[test]
    fn test_save_and_load_board() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let mut board = Board::new();
        let a = board.add_column("A").unwrap();
        let b = board.add_column("B").unwrap();
        let card = board.add_item("card", &ContainerRef::Named(a.clone())).unwrap();
        board.begin_drag(&b);
        board.end_drag(Some(&crate::models::DropTarget::Container(
            ContainerRef::Named(a.clone()),
        )));

        assert!(save_board(&mut board, &store).unwrap());
        assert!(!board.dirty);
        assert!(!save_board(&mut board, &store).unwrap());

        let loaded = load_board(&store);
        let order: Vec<&str> = loaded.columns().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec![b.as_str(), a.as_str()]);
        assert_eq!(loaded.locate(&card), Some((ContainerRef::Named(a), 0)));
        assert!(!loaded.dirty);
    }

    #[test]
    fn test_load_documents_grouped_by_container() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        fs::write(
            store.path_of(Resource::Containers),
            r#"{"containers":{"A":["i1"]},"containerOrder":["A"]}"#,
        )
        .unwrap();
        fs::write(
            store.path_of(Resource::Items),
            r#"{"items":{"A":[{"id":"i1","name":"Motor"}]}}"#,
        )
        .unwrap();
        fs::write(
            store.path_of(Resource::MiniContainers),
            r#"{"miniContainers":{"A":["m1"]}}"#,
        )
        .unwrap();

        let mut board = load_board(&store);
        let a = ContainerRef::Named("A".to_string());
        assert_eq!(board.item_count(), 1);
        assert_eq!(board.items_in(&a)[0].name, "Motor");
        assert_eq!(board.minis_of("A")[0].name, "m1");
        assert!(!board.dirty);

        board.add_pool_item("extra");
        assert!(save_board(&mut board, &store).unwrap());
        let items: ItemsDoc = store.read(Resource::Items);
        assert_eq!(items.items["A"][0].name, "Motor");
        let minis: MiniDoc = store.read(Resource::MiniContainers);
        assert_eq!(minis.mini_containers["A"], vec!["m1"]);
    }

    #[test]
    fn test_load_from_empty_directory() {
        let dir = tempdir().unwrap();
        let board = load_board(&JsonStore::new(dir.path()));
        assert!(board.columns().is_empty());
        assert_eq!(board.item_count(), 0);
    }
}
