//! Host orchestrator.
//!
//! The host owns the storage network together with everything the network
//! needs from outside: the grid world it queries for adjacency, the ledger
//! that receives drops and the repository that keeps node records. It keeps
//! world cells, network nodes and saved records in step, and exposes the
//! frame clock that drives the save and maintenance ticks.

use storage_core::{
    Capacity, ItemVariant, NetworkError, NodeId, NodeSummary, Position, StorageNetwork,
    StorageNode, TransferMode, codec,
};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::oracle::{DropLedger, GridWorld};
use crate::repository::{FileNodeRepository, InMemoryNodeRepository, NodeRepository};

/// Storage network embedded in a grid world.
pub struct Host {
    config: RuntimeConfig,
    network: StorageNetwork,
    world: GridWorld,
    drops: DropLedger,
    repository: Box<dyn NodeRepository>,
    frame: u64,
}

impl Host {
    /// Create a new host builder
    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn network(&self) -> &StorageNetwork {
        &self.network
    }

    /// Direct access for bindings and unlinks.
    pub fn network_mut(&mut self) -> &mut StorageNetwork {
        &mut self.network
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Direct access for loading and unloading cells.
    pub fn world_mut(&mut self) -> &mut GridWorld {
        &mut self.world
    }

    pub fn drops(&self) -> &DropLedger {
        &self.drops
    }

    pub fn drops_mut(&mut self) -> &mut DropLedger {
        &mut self.drops
    }

    pub fn repository(&self) -> &dyn NodeRepository {
        self.repository.as_ref()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn node_at(&self, position: Position) -> Option<NodeId> {
        self.world.node_at(position)
    }

    /// Places an empty node with the configured capacity.
    pub fn place(&mut self, position: Position) -> Result<NodeId> {
        self.place_with(position, self.config.capacity)
    }

    /// Places an empty node with an explicit capacity.
    pub fn place_with(&mut self, position: Position, capacity: Capacity) -> Result<NodeId> {
        self.ensure_vacant(position)?;
        let node = self.network.place(position, capacity, &self.world);
        self.world.occupy(position, node);
        tracing::info!(%node, %position, "node placed");
        Ok(node)
    }

    /// Recreates the node at `position` from its saved record. A missing
    /// record yields an empty node; an unreadable tail loses only the
    /// records after the damage.
    pub fn load(&mut self, position: Position, capacity: Capacity) -> Result<NodeId> {
        self.ensure_vacant(position)?;
        let items = self.read_record(position)?;
        Ok(self.place_loaded(position, capacity, items))
    }

    /// Loads every saved node whose cell is vacant, using the configured
    /// capacity. Returns the loaded nodes in cell order.
    ///
    /// A record that cannot be decoded loads as an empty node and stays on
    /// disk until that node is saved again.
    pub fn load_saved(&mut self) -> Result<Vec<NodeId>> {
        let mut loaded = Vec::new();
        for position in self.repository.list_positions()? {
            if self.world.node_at(position).is_some() {
                continue;
            }
            let items = match self.read_record(position) {
                Ok(items) => items,
                Err(RuntimeError::Codec(err)) => {
                    tracing::warn!(%position, %err, "unreadable record, loading an empty node");
                    Vec::new()
                }
                Err(err) => return Err(err),
            };
            loaded.push(self.place_loaded(position, self.config.capacity, items));
        }
        Ok(loaded)
    }

    /// Removes the node at `position`, deleting its saved record and then
    /// spilling its items into the drop ledger.
    ///
    /// If the record cannot be deleted the node stays in place with its
    /// items, so a restart never finds both the record and the drops.
    pub fn remove(&mut self, position: Position) -> Result<StorageNode> {
        let node = self
            .world
            .node_at(position)
            .ok_or(RuntimeError::EmptyCell(position))?;
        self.repository.delete(position)?;
        let retired = self.network.remove(node, &mut self.drops)?;
        self.world.vacate(position);
        Ok(retired)
    }

    pub fn give(
        &mut self,
        node: NodeId,
        item: &ItemVariant,
        amount: u32,
        mode: TransferMode,
    ) -> Result<bool> {
        Ok(self.network.give(node, item, amount, mode)?)
    }

    pub fn take(
        &mut self,
        node: NodeId,
        item: &ItemVariant,
        amount: u32,
        mode: TransferMode,
    ) -> Result<Option<ItemVariant>> {
        Ok(self.network.take(node, item, amount, mode)?)
    }

    pub fn summary(&self, node: NodeId) -> Result<NodeSummary> {
        Ok(self.network.summary(node)?)
    }

    /// Frequent tick: writes the record of every node changed since the
    /// last pass. Returns how many records were written.
    ///
    /// On a failed write the failing node and every node after it stay
    /// queued for the next pass.
    pub fn save_pass(&mut self) -> Result<usize> {
        let pending = self.network.drain_save_queue();
        for (index, &node) in pending.iter().enumerate() {
            if let Err(err) = self.save_node(node) {
                for &unsaved in &pending[index..] {
                    let _ = self.network.mark_dirty(unsaved);
                }
                tracing::warn!(%node, %err, "save pass aborted");
                return Err(err);
            }
        }
        if !pending.is_empty() {
            tracing::debug!(saved = pending.len(), "save pass finished");
        }
        Ok(pending.len())
    }

    /// Low-frequency tick: retries discovery for nodes that need it.
    pub fn maintenance_tick(&mut self) -> usize {
        let rediscovered = self.network.maintenance_tick(&self.world);
        if rediscovered > 0 {
            tracing::debug!(rediscovered, "maintenance tick finished");
        }
        rediscovered
    }

    /// Advances the frame clock. Every frame runs a save pass; every
    /// `maintenance_interval` frames also runs a maintenance tick.
    pub fn advance(&mut self, frames: u32) -> Result<()> {
        let interval = u64::from(self.config.maintenance_interval.max(1));
        for _ in 0..frames {
            self.frame += 1;
            if self.frame % interval == 0 {
                self.maintenance_tick();
            }
            self.save_pass()?;
        }
        Ok(())
    }

    fn save_node(&self, node: NodeId) -> Result<()> {
        let entry = self
            .network
            .node(node)
            .ok_or(NetworkError::UnknownNode(node))?;
        let record = codec::encode(entry.inventory())?;
        self.repository.save(entry.position(), &record)?;
        Ok(())
    }

    fn read_record(&self, position: Position) -> Result<Vec<ItemVariant>> {
        match self.repository.load(position)? {
            Some(record) => Ok(codec::decode(&record)?),
            None => Ok(Vec::new()),
        }
    }

    fn place_loaded(
        &mut self,
        position: Position,
        capacity: Capacity,
        items: Vec<ItemVariant>,
    ) -> NodeId {
        let restored = items.len();
        let node = self
            .network
            .place_restored(position, capacity, items, &self.world);
        self.world.occupy(position, node);
        tracing::info!(%node, %position, restored, "node loaded");
        node
    }

    fn ensure_vacant(&self, position: Position) -> Result<()> {
        match self.world.node_at(position) {
            Some(_) => Err(RuntimeError::CellOccupied(position)),
            None => Ok(()),
        }
    }
}

/// Builder for [`Host`].
pub struct HostBuilder {
    config: RuntimeConfig,
    world: GridWorld,
    repository: Option<Box<dyn NodeRepository>>,
}

impl HostBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: GridWorld::new(),
            repository: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Starts from a pre-populated world, e.g. with unloaded cells.
    pub fn world(mut self, world: GridWorld) -> Self {
        self.world = world;
        self
    }

    /// Overrides the repository chosen from the configuration.
    pub fn repository(mut self, repository: impl NodeRepository + 'static) -> Self {
        self.repository = Some(Box::new(repository));
        self
    }

    /// Builds the host. Without an explicit repository, records go to
    /// `save_dir` when configured and to memory otherwise.
    pub fn build(self) -> Result<Host> {
        let repository: Box<dyn NodeRepository> = match (self.repository, &self.config.save_dir) {
            (Some(repository), _) => repository,
            (None, Some(dir)) => Box::new(FileNodeRepository::new(dir)?),
            (None, None) => Box::new(InMemoryNodeRepository::new()),
        };

        tracing::info!(
            capacity = ?self.config.capacity,
            maintenance_interval = self.config.maintenance_interval,
            save_dir = ?self.config.save_dir,
            "host ready"
        );

        Ok(Host {
            config: self.config,
            network: StorageNetwork::new(),
            world: self.world,
            drops: DropLedger::new(),
            repository,
            frame: 0,
        })
    }
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}
