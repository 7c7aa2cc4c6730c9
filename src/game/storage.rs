use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::IVec;

use crate::game::errors::GameError;
use crate::game::state::GameState;
use crate::game::types::{
    Connection, ConnectionRecord, PlayerId, Room, SaveRecord, WorldMeta,
    CONNECTION_SCHEMA_VERSION, ROOM_SCHEMA_VERSION, SAVE_SCHEMA_VERSION,
    WORLD_META_SCHEMA_VERSION,
};
use crate::game::world::{canonical_world, World};

const TREE_ROOMS: &str = "rooms";
const TREE_CONNECTIONS: &str = "connections";
const TREE_PROGRESS: &str = "progress";
const TREE_WORLD: &str = "world";

const WORLD_META_ID: u32 = 0;

/// A row type stored in its own sled tree.
///
/// Rows are bincode encoded and carry a schema version that is checked on read.
pub trait Table: Serialize + DeserializeOwned + Send + 'static {
    const NAME: &'static str;
    const ENTITY: &'static str;
    const SCHEMA_VERSION: u8;

    fn key(&self) -> Vec<u8>;
    fn schema_version(&self) -> u8;
    fn set_schema_version(&mut self, version: u8);

    /// Key for a row addressed by numeric id.
    fn id_key(id: u32) -> Vec<u8> {
        id.to_be_bytes().to_vec()
    }
}

impl Table for Room {
    const NAME: &'static str = TREE_ROOMS;
    const ENTITY: &'static str = "room";
    const SCHEMA_VERSION: u8 = ROOM_SCHEMA_VERSION;

    fn key(&self) -> Vec<u8> {
        Self::id_key(self.id)
    }
    fn schema_version(&self) -> u8 {
        self.schema_version
    }
    fn set_schema_version(&mut self, version: u8) {
        self.schema_version = version;
    }
}

impl Table for ConnectionRecord {
    const NAME: &'static str = TREE_CONNECTIONS;
    const ENTITY: &'static str = "connection";
    const SCHEMA_VERSION: u8 = CONNECTION_SCHEMA_VERSION;

    fn key(&self) -> Vec<u8> {
        let mut key = self.connection.from.to_be_bytes().to_vec();
        key.extend_from_slice(&self.connection.to.to_be_bytes());
        key
    }
    fn schema_version(&self) -> u8 {
        self.schema_version
    }
    fn set_schema_version(&mut self, version: u8) {
        self.schema_version = version;
    }
}

impl Table for SaveRecord {
    const NAME: &'static str = TREE_PROGRESS;
    const ENTITY: &'static str = "progress";
    const SCHEMA_VERSION: u8 = SAVE_SCHEMA_VERSION;

    fn key(&self) -> Vec<u8> {
        Self::id_key(self.player_id)
    }
    fn schema_version(&self) -> u8 {
        self.schema_version
    }
    fn set_schema_version(&mut self, version: u8) {
        self.schema_version = version;
    }
}

impl Table for WorldMeta {
    const NAME: &'static str = TREE_WORLD;
    const ENTITY: &'static str = "world";
    const SCHEMA_VERSION: u8 = WORLD_META_SCHEMA_VERSION;

    fn key(&self) -> Vec<u8> {
        Self::id_key(WORLD_META_ID)
    }
    fn schema_version(&self) -> u8 {
        self.schema_version
    }
    fn set_schema_version(&mut self, version: u8) {
        self.schema_version = version;
    }
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct GameStoreBuilder {
    path: PathBuf,
    ensure_world_seed: bool,
    world: Option<World>,
}

impl GameStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ensure_world_seed: true,
            world: None,
        }
    }

    /// Opt out of seeding a world during initialization (useful for targeted tests).
    pub fn without_world_seed(mut self) -> Self {
        self.ensure_world_seed = false;
        self
    }

    /// Seed this world instead of the canonical mansion when the store is empty.
    pub fn with_world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    pub fn open(self) -> Result<GameStore, GameError> {
        let seed = if self.ensure_world_seed {
            Some(self.world.unwrap_or_else(canonical_world))
        } else {
            None
        };
        GameStore::open_with_options(self.path, seed)
    }
}

/// Sled-backed persistence for rooms, connections and player progress.
///
/// Every call opens the tree it needs and drops it on return; nothing is
/// carried between calls except the database handle itself.
pub struct GameStore {
    db: sled::Db,
}

impl GameStore {
    /// Open (or create) the store rooted at `path`, seeding the canonical
    /// mansion if no rooms exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        Self::open_with_options(path, Some(canonical_world()))
    }

    fn open_with_options<P: AsRef<Path>>(path: P, seed: Option<World>) -> Result<Self, GameError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let store = Self { db };

        if let Some(world) = seed {
            store.seed_if_empty(&world)?;
        }

        Ok(store)
    }

    fn table<T: Table>(&self) -> Result<sled::Tree, GameError> {
        Ok(self.db.open_tree(T::NAME)?)
    }

    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, GameError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: Table>(bytes: IVec) -> Result<T, GameError> {
        let record: T = bincode::deserialize(&bytes)?;
        if record.schema_version() != T::SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: T::ENTITY,
                expected: T::SCHEMA_VERSION,
                found: record.schema_version(),
            });
        }
        Ok(record)
    }

    /// Insert or replace a row, stamping the current schema version.
    pub fn execute_write<T: Table>(&self, mut row: T) -> Result<(), GameError> {
        row.set_schema_version(T::SCHEMA_VERSION);
        let tree = self.table::<T>()?;
        let bytes = Self::serialize(&row)?;
        tree.insert(row.key(), bytes)?;
        tree.flush()?;
        Ok(())
    }

    /// Every row of a table, in key order.
    pub fn fetch_all<T: Table>(&self) -> Result<Vec<T>, GameError> {
        self.query(|_: &T| true)
    }

    /// Fetch a row by id. A missing row is `Ok(None)`, not an error.
    pub fn fetch_row<T: Table>(&self, id: u32) -> Result<Option<T>, GameError> {
        let tree = self.table::<T>()?;
        match tree.get(T::id_key(id))? {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    /// Rows of a table matching `predicate`, in key order.
    pub fn query<T, P>(&self, predicate: P) -> Result<Vec<T>, GameError>
    where
        T: Table,
        P: Fn(&T) -> bool,
    {
        let tree = self.table::<T>()?;
        let mut rows = Vec::new();
        for entry in tree.iter() {
            let (_, value) = entry?;
            let row: T = Self::deserialize(value)?;
            if predicate(&row) {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Remove a row by id; returns whether it existed.
    pub fn delete_row<T: Table>(&self, id: u32) -> Result<bool, GameError> {
        let tree = self.table::<T>()?;
        let existed = tree.remove(T::id_key(id))?.is_some();
        tree.flush()?;
        Ok(existed)
    }

    pub fn count<T: Table>(&self) -> Result<usize, GameError> {
        Ok(self.table::<T>()?.len())
    }

    /// Insert or update a room record.
    pub fn put_room(&self, room: Room) -> Result<(), GameError> {
        self.execute_write(room)
    }

    pub fn get_room(&self, room_id: u32) -> Result<Room, GameError> {
        self.fetch_row::<Room>(room_id)?
            .ok_or_else(|| GameError::NotFound(format!("room: {}", room_id)))
    }

    pub fn put_connection(&self, a: u32, b: u32) -> Result<(), GameError> {
        self.execute_write(ConnectionRecord::from(Connection::new(a, b)))
    }

    pub fn list_connections(&self) -> Result<Vec<Connection>, GameError> {
        Ok(self
            .fetch_all::<ConnectionRecord>()?
            .into_iter()
            .map(|record| record.connection)
            .collect())
    }

    pub fn save_progress(&self, state: &GameState) -> Result<(), GameError> {
        self.execute_write(state.to_save_record())
    }

    /// Restore a player's progress. `Ok(None)` when nothing was saved.
    pub fn load_progress(&self, player_id: PlayerId) -> Result<Option<GameState>, GameError> {
        Ok(self
            .fetch_row::<SaveRecord>(player_id)?
            .map(GameState::from_save_record))
    }

    pub fn delete_progress(&self, player_id: PlayerId) -> Result<bool, GameError> {
        self.delete_row::<SaveRecord>(player_id)
    }

    pub fn list_player_ids(&self) -> Result<Vec<PlayerId>, GameError> {
        Ok(self
            .fetch_all::<SaveRecord>()?
            .into_iter()
            .map(|record| record.player_id)
            .collect())
    }

    /// Write a complete world: rooms, connections and the win requirement.
    pub fn seed_world(&self, world: &World) -> Result<usize, GameError> {
        world.validate()?;
        for room in &world.rooms {
            self.put_room(room.clone())?;
        }
        for connection in &world.connections {
            self.put_connection(connection.from, connection.to)?;
        }
        self.execute_write(WorldMeta {
            start_room: world.start_room,
            required_clues: world.required_clues.clone(),
            schema_version: WORLD_META_SCHEMA_VERSION,
        })?;
        debug!(
            "Seeded world: {} rooms, {} connections",
            world.rooms.len(),
            world.connections.len()
        );
        Ok(world.rooms.len())
    }

    /// Seed `world` only when no rooms exist yet; returns the rooms inserted.
    pub fn seed_if_empty(&self, world: &World) -> Result<usize, GameError> {
        if self.count::<Room>()? > 0 {
            return Ok(0);
        }
        self.seed_world(world)
    }

    pub fn seed_world_if_needed(&self) -> Result<usize, GameError> {
        self.seed_if_empty(&canonical_world())
    }

    /// Reassemble the stored world.
    pub fn load_world(&self) -> Result<World, GameError> {
        let meta = self
            .fetch_row::<WorldMeta>(WORLD_META_ID)?
            .ok_or_else(|| GameError::NotFound("world settings".to_string()))?;
        let world = World {
            rooms: self.fetch_all::<Room>()?,
            connections: self.list_connections()?,
            required_clues: meta.required_clues,
            start_room: meta.start_room,
        };
        world.validate()?;
        Ok(world)
    }
}

/// Async handle over [`GameStore`].
///
/// Each call runs on tokio's blocking pool and resolves exactly once, with the
/// result or the storage error. Clones share the same underlying store.
#[derive(Clone)]
pub struct GameDatabase {
    store: Arc<GameStore>,
}

impl GameDatabase {
    pub fn new(store: GameStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Open the store at `path` on the blocking pool, seeding the canonical
    /// mansion if it is empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, GameError> {
        Self::from_builder(GameStoreBuilder::new(path)).await
    }

    pub async fn from_builder(builder: GameStoreBuilder) -> Result<Self, GameError> {
        let store = tokio::task::spawn_blocking(move || builder.open())
            .await
            .map_err(|e| GameError::Internal(format!("storage worker failed: {}", e)))??;
        Ok(Self::new(store))
    }

    async fn run<R, F>(&self, op: F) -> Result<R, GameError>
    where
        F: FnOnce(&GameStore) -> Result<R, GameError> + Send + 'static,
        R: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| GameError::Internal(format!("storage worker failed: {}", e)))?;
        if let Err(ref e) = result {
            warn!("Storage call failed: {}", e);
        }
        result
    }

    pub async fn query<T, P>(&self, predicate: P) -> Result<Vec<T>, GameError>
    where
        T: Table,
        P: Fn(&T) -> bool + Send + 'static,
    {
        self.run(move |store| store.query(predicate)).await
    }

    pub async fn execute_write<T: Table>(&self, row: T) -> Result<(), GameError> {
        self.run(move |store| store.execute_write(row)).await
    }

    pub async fn fetch_all<T: Table>(&self) -> Result<Vec<T>, GameError> {
        self.run(|store| store.fetch_all::<T>()).await
    }

    pub async fn fetch_row<T: Table>(&self, id: u32) -> Result<Option<T>, GameError> {
        self.run(move |store| store.fetch_row::<T>(id)).await
    }

    pub async fn list_connections(&self) -> Result<Vec<Connection>, GameError> {
        self.run(|store| store.list_connections()).await
    }

    pub async fn save_progress(&self, state: &GameState) -> Result<(), GameError> {
        let record = state.to_save_record();
        self.execute_write(record).await
    }

    pub async fn load_progress(&self, player_id: PlayerId) -> Result<Option<GameState>, GameError> {
        self.run(move |store| store.load_progress(player_id)).await
    }

    pub async fn delete_progress(&self, player_id: PlayerId) -> Result<bool, GameError> {
        self.run(move |store| store.delete_progress(player_id)).await
    }

    pub async fn list_player_ids(&self) -> Result<Vec<PlayerId>, GameError> {
        self.run(|store| store.list_player_ids()).await
    }

    pub async fn seed_world(&self, world: World) -> Result<usize, GameError> {
        self.run(move |store| store.seed_world(&world)).await
    }

    pub async fn load_world(&self) -> Result<World, GameError> {
        self.run(|store| store.load_world()).await
    }
}
