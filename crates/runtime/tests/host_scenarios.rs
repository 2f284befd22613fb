use storage_core::{
    BinInventory, Capacity, ItemId, ItemVariant, NodeState, Position, StorageError, TransferMode,
    codec,
};
use storage_runtime::{
    FileNodeRepository, GridWorld, Host, InMemoryNodeRepository, NodeRepository, RepositoryError,
    RuntimeConfig, RuntimeError,
};
use tempfile::TempDir;

const ORE: ItemId = ItemId(5);
const TORCH: ItemId = ItemId(9);

fn at(x: i32) -> Position {
    Position::new(x, 0, 0)
}

fn record(capacity: Capacity, items: Vec<ItemVariant>) -> Vec<u8> {
    let mut inventory = BinInventory::new(capacity);
    assert_eq!(inventory.restore(items), 0);
    codec::encode(&inventory).unwrap()
}

/// A row of crates pools into one group, spills on removal and keeps the
/// survivors pooled even after the row is cut in two.
#[test]
fn row_of_crates_pools_and_spills() {
    let mut host = Host::builder().build().unwrap();

    let a = host.place(at(0)).unwrap();
    let b = host.place(at(1)).unwrap();
    let c = host.place(at(2)).unwrap();

    let group = host.network().group_of(a).unwrap();
    assert_eq!(host.network().group_of(b), Some(group));
    assert_eq!(host.network().group_of(c), Some(group));
    assert_eq!(host.network().group(group).unwrap().len(), 3);

    let torch = ItemVariant::single(TORCH);
    assert!(host.give(b, &torch, 1, TransferMode::Commit).unwrap());
    assert!(host.give(b, &torch, 1, TransferMode::Commit).unwrap());

    let removed = host.remove(at(1)).unwrap();
    assert_eq!(removed.state(), NodeState::Removed);
    assert_eq!(host.drops().len(), 2);
    assert!(host.drops().drops().iter().all(|drop| drop.position == at(1)));
    assert_eq!(host.node_at(at(1)), None);

    // The cut leaves a and c physically apart but still pooled.
    assert_eq!(host.network().group_of(a), host.network().group_of(c));
    assert_eq!(host.network().group_totals(group).unwrap().members, 2);

    // Maintenance does not re-split them either.
    host.advance(RuntimeConfig::DEFAULT_MAINTENANCE_INTERVAL).unwrap();
    assert_eq!(host.network().group_of(a), host.network().group_of(c));
}

#[test]
fn placing_on_an_occupied_cell_is_rejected() {
    let mut host = Host::builder().build().unwrap();
    host.place(at(0)).unwrap();

    let err = host.place(at(0)).unwrap_err();
    assert!(matches!(err, RuntimeError::CellOccupied(position) if position == at(0)));
    assert_eq!(err.error_code(), "RUNTIME_CELL_OCCUPIED");

    let err = host.remove(at(4)).unwrap_err();
    assert!(matches!(err, RuntimeError::EmptyCell(_)));
}

/// Two crates placed while their cells are still streaming in stay apart
/// until the cells load and the maintenance tick comes around.
#[test]
fn unloaded_neighbor_joins_on_maintenance() {
    let mut world = GridWorld::new();
    world.unload(at(0));
    world.unload(at(1));
    let config = RuntimeConfig {
        maintenance_interval: 5,
        ..RuntimeConfig::default()
    };
    let mut host = Host::builder().config(config).world(world).build().unwrap();

    let a = host.place(at(0)).unwrap();
    let b = host.place(at(1)).unwrap();
    assert!(host.network().node(a).unwrap().is_inconclusive());
    assert!(host.network().node(b).unwrap().is_inconclusive());
    assert_ne!(host.network().group_of(a), host.network().group_of(b));

    host.world_mut().load(at(0));
    host.world_mut().load(at(1));
    host.advance(4).unwrap();
    assert_ne!(host.network().group_of(a), host.network().group_of(b));

    host.advance(1).unwrap();
    assert_eq!(host.network().group_of(a), host.network().group_of(b));
    assert!(!host.network().node(a).unwrap().is_inconclusive());
    assert!(!host.network().node(b).unwrap().is_inconclusive());
}

#[test]
fn save_pass_writes_changed_nodes_once() {
    let mut host = Host::builder()
        .repository(InMemoryNodeRepository::new())
        .build()
        .unwrap();
    let a = host.place(at(0)).unwrap();
    host.place(at(5)).unwrap();

    // Placing alone does not make a node dirty.
    assert_eq!(host.save_pass().unwrap(), 0);

    let torch = ItemVariant::single(TORCH);
    assert!(host.give(a, &torch, 1, TransferMode::DryRun).unwrap());
    assert_eq!(host.save_pass().unwrap(), 0);

    assert!(host.give(a, &torch, 1, TransferMode::Commit).unwrap());
    assert!(host.give(a, &torch, 1, TransferMode::Commit).unwrap());
    assert_eq!(host.save_pass().unwrap(), 1);
    assert_eq!(host.save_pass().unwrap(), 0);

    let saved = host.repository().load(at(0)).unwrap().unwrap();
    assert_eq!(codec::decode(&saved).unwrap(), vec![torch.clone(), torch]);
    assert!(!host.repository().exists(at(5)));
}

/// Records survive a restart through the file repository and are removed
/// with their node.
#[test]
fn file_records_survive_a_restart() {
    let temp = TempDir::new().unwrap();
    let config = RuntimeConfig {
        save_dir: Some(temp.path().to_path_buf()),
        ..RuntimeConfig::default()
    };

    let torch = ItemVariant::single(TORCH);
    {
        let mut host = Host::builder().config(config.clone()).build().unwrap();
        let a = host.place(at(0)).unwrap();
        let b = host.place(at(1)).unwrap();
        host.give(a, &torch, 1, TransferMode::Commit).unwrap();
        host.give(b, &torch, 1, TransferMode::Commit).unwrap();
        host.advance(1).unwrap();
    }

    let mut host = Host::builder().config(config).build().unwrap();
    let loaded = host.load_saved().unwrap();
    assert_eq!(loaded.len(), 2);

    let a = host.node_at(at(0)).unwrap();
    let b = host.node_at(at(1)).unwrap();
    assert_eq!(host.network().group_of(a), host.network().group_of(b));
    assert_eq!(host.summary(a).unwrap().bins, vec![torch.to_string()]);

    host.remove(at(0)).unwrap();
    let repo = FileNodeRepository::new(temp.path()).unwrap();
    assert_eq!(repo.list_positions().unwrap(), vec![at(1)]);
}

#[test]
fn loading_restores_stacks_and_drops_what_no_longer_fits() {
    let repo = InMemoryNodeRepository::new();
    let wide = Capacity::new(3, 100, 300);
    repo.save(
        at(0),
        &record(
            wide,
            vec![
                ItemVariant::plain_stack(ORE, 40),
                ItemVariant::single(TORCH),
                ItemVariant::plain_stack(ItemId(6), 80),
            ],
        ),
    )
    .unwrap();

    let mut host = Host::builder().repository(repo).build().unwrap();
    let node = host.load(at(0), Capacity::new(2, 100, 100)).unwrap();

    let stored: Vec<_> = host
        .network()
        .node(node)
        .unwrap()
        .inventory()
        .items()
        .cloned()
        .collect();
    assert_eq!(
        stored,
        vec![ItemVariant::plain_stack(ORE, 40), ItemVariant::single(TORCH)]
    );

    // Restored stacks accept more of the same kind.
    let ore = ItemVariant::plain_stack(ORE, 1);
    assert!(host.give(node, &ore, 10, TransferMode::Commit).unwrap());
    let taken = host.take(node, &ore, 100, TransferMode::Commit).unwrap();
    assert_eq!(taken, Some(ItemVariant::plain_stack(ORE, 50)));
}

#[test]
fn missing_record_loads_an_empty_node() {
    let mut host = Host::builder().build().unwrap();
    let node = host.load(at(3), Capacity::default()).unwrap();
    assert!(host.network().node(node).unwrap().inventory().is_empty());
}

/// Keeps records in memory but refuses to delete them.
struct UndeletableRepository(InMemoryNodeRepository);

impl NodeRepository for UndeletableRepository {
    fn save(&self, position: Position, record: &[u8]) -> storage_runtime::repository::Result<()> {
        self.0.save(position, record)
    }

    fn load(&self, position: Position) -> storage_runtime::repository::Result<Option<Vec<u8>>> {
        self.0.load(position)
    }

    fn exists(&self, position: Position) -> bool {
        self.0.exists(position)
    }

    fn delete(&self, _position: Position) -> storage_runtime::repository::Result<()> {
        Err(RepositoryError::Io(std::io::Error::other("read-only volume")))
    }
}

#[test]
fn failed_record_delete_keeps_the_node_and_its_items() {
    let mut host = Host::builder()
        .repository(UndeletableRepository(InMemoryNodeRepository::new()))
        .build()
        .unwrap();
    let a = host.place(at(0)).unwrap();
    let torch = ItemVariant::single(TORCH);
    assert!(host.give(a, &torch, 1, TransferMode::Commit).unwrap());
    host.advance(1).unwrap();

    let err = host.remove(at(0)).unwrap_err();
    assert!(matches!(err, RuntimeError::Repository(RepositoryError::Io(_))));

    assert!(host.drops().is_empty());
    assert_eq!(host.node_at(at(0)), Some(a));
    let node = host.network().node(a).unwrap();
    assert_ne!(node.state(), NodeState::Removed);
    assert_eq!(node.inventory().num_items(), 1);
    assert!(host.repository().exists(at(0)));
}

#[test]
fn unreadable_record_loads_as_an_empty_node() {
    let repo = InMemoryNodeRepository::new();
    repo.save(at(0), &[1, 0]).unwrap();
    repo.save(
        at(1),
        &record(Capacity::default(), vec![ItemVariant::single(TORCH)]),
    )
    .unwrap();

    let mut host = Host::builder().repository(repo).build().unwrap();
    let loaded = host.load_saved().unwrap();
    assert_eq!(loaded.len(), 2);

    let damaged = host.node_at(at(0)).unwrap();
    let intact = host.node_at(at(1)).unwrap();
    assert!(host.network().node(damaged).unwrap().inventory().is_empty());
    let kept: Vec<_> = host
        .network()
        .node(intact)
        .unwrap()
        .inventory()
        .items()
        .cloned()
        .collect();
    assert_eq!(kept, vec![ItemVariant::single(TORCH)]);
    assert_eq!(host.network().group_of(damaged), host.network().group_of(intact));

    // The damaged record stays until its node saves again.
    assert_eq!(host.repository().load(at(0)).unwrap(), Some(vec![1, 0]));
}
