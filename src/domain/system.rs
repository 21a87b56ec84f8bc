//! `TicketingEngine`: the index-composition layer wiring the generic
//! storage primitives into the railway ticketing workload. Enough logic
//! to exercise every storage primitive end-to-end, not a full fare
//! calculator or transfer search (see `DESIGN.md` for the open question
//! this leaves unresolved).

use std::{
    cell::Cell,
    collections::HashSet,
    path::{Path, PathBuf},
};

use crate::btree::BPlusTree;
use crate::error::{Error, Result};
use crate::storage::{codec::Codec, hash_map_file::HashMapFile, record_heap::RecordHeap, vector_file::VectorFile};
use crate::types::{DateTime, FixedString};
use crate::util::string_hash;

use super::order::{Order, OrderStatus};
use super::train::{SeatMatrix, Train, TrainLite, TrainState};
use super::user::User;

/// `(train_index, departure_day, order_serial) -> order_serial`: the
/// pending queue per (train, date), iterated in ascending `order_serial`
/// (insertion) order for FIFO promotion.
type TrainUnitKey = (u32, u16, u32);

/// Composes the B+-trees, record heaps and small persistent containers
/// into one handle over a directory of sidecar files. Every method
/// either round-trips through one of those
/// primitives or is a thin read/modify/write on top of them; there is no
/// buffering beyond what the storage layer already provides.
pub struct TicketingEngine {
    trains_state: BPlusTree<u64, TrainState>,
    stations_map: BPlusTree<(u64, u32), TrainLite>,
    train_unit_map: BPlusTree<TrainUnitKey, u32>,
    user_orders_map: BPlusTree<(u64, u32), u32>,

    trains_heap: RecordHeap,
    seats_heap: RecordHeap,
    orders_heap: RecordHeap,

    train_id_array: VectorFile<FixedString<20>>,
    users: HashMapFile<u64, User>,
    login_users: HashSet<u64>,

    next_order_serial: Cell<u32>,
}

fn path_in(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

fn open_or_create_tree<K: Codec + Ord + Clone, V: Codec + Clone>(
    dir: &Path,
    name: &str,
    fresh: bool,
) -> Result<BPlusTree<K, V>> {
    let path = path_in(dir, name);
    if fresh || !path.exists() {
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        BPlusTree::create(&path)
    } else {
        BPlusTree::open(&path)
    }
}

fn open_or_create_heap(dir: &Path, name: &str, record_size: usize, fresh: bool) -> Result<RecordHeap> {
    let path = path_in(dir, name);
    if fresh || !path.exists() {
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        RecordHeap::create(&path, record_size)
    } else {
        RecordHeap::open(&path, record_size)
    }
}

impl TicketingEngine {
    fn open_with(dir: &Path, fresh: bool) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let trains_state = open_or_create_tree(dir, "trains_state.idx", fresh)?;
        let stations_map = open_or_create_tree(dir, "stations_map.idx", fresh)?;
        let train_unit_map = open_or_create_tree(dir, "train_unit_map.idx", fresh)?;
        let user_orders_map = open_or_create_tree(dir, "user_orders_map.idx", fresh)?;

        let trains_heap = open_or_create_heap(dir, "trains.heap", Train::SIZE, fresh)?;
        let seats_heap = open_or_create_heap(dir, "seats.heap", SeatMatrix::SIZE, fresh)?;
        let orders_heap = open_or_create_heap(dir, "orders.heap", Order::SIZE, fresh)?;

        let train_id_array_path = path_in(dir, "train_id_array.vec");
        if fresh {
            std::fs::remove_file(&train_id_array_path).ok();
        }
        let train_id_array = VectorFile::open(&train_id_array_path)?;

        let users_path = path_in(dir, "users.map");
        if fresh {
            std::fs::remove_file(&users_path).ok();
        }
        let users = HashMapFile::open(&users_path)?;

        let next_order_serial = if fresh {
            0
        } else {
            match Self::max_order_serial(&orders_heap)? {
                Some(max) => max + 1,
                None => 0,
            }
        };

        Ok(Self {
            trains_state,
            stations_map,
            train_unit_map,
            user_orders_map,
            trains_heap,
            seats_heap,
            orders_heap,
            train_id_array,
            users,
            login_users: HashSet::new(),
            next_order_serial: Cell::new(next_order_serial),
        })
    }

    /// Scans every order already on disk and returns the highest
    /// `order_serial` issued so far, or `None` on an empty heap. Run once
    /// at `open` so serials keep increasing across a reopen instead of
    /// restarting at 0 and colliding with surviving pending-queue keys.
    fn max_order_serial(orders_heap: &RecordHeap) -> Result<Option<u32>> {
        let mut max = None;
        for index in 1..=orders_heap.len()? {
            let order = Order::decode(&orders_heap.read_full(index)?);
            max = Some(match max {
                Some(current) if current >= order.order_serial => current,
                _ => order.order_serial,
            });
        }
        Ok(max)
    }

    /// Opens (or creates, if absent) the ticketing engine's files under
    /// `dir`. Each logical index/heap owns one file.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(dir.as_ref(), false)
    }

    /// Truncates every state file under `dir` and starts fresh, matching
    /// a `clean` command at the API level; command parsing itself is out
    /// of scope.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(dir.as_ref(), true)
    }

    fn next_serial(&self) -> u32 {
        let serial = self.next_order_serial.get();
        self.next_order_serial.set(serial + 1);
        serial
    }

    // ---------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------

    /// Registers a new user. Fails with `DuplicateKey` if the username is
    /// already taken.
    pub fn add_user(&mut self, user: User) -> Result<()> {
        let hash = string_hash(user.username.as_str());
        if self.users.contains_key(&hash) {
            return Err(Error::DuplicateKey);
        }
        self.users.insert(hash, user)?;
        Ok(())
    }

    /// Logs a user in by checking the given password against the stored
    /// record.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let hash = string_hash(username);
        let user = self.users.get(&hash).ok_or(Error::NotFound)?;
        if user.password.as_str() != password {
            return Err(Error::Unauthorized);
        }
        self.login_users.insert(hash);
        Ok(())
    }

    pub fn logout(&mut self, username: &str) -> Result<()> {
        let hash = string_hash(username);
        if !self.login_users.remove(&hash) {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    pub fn is_logged_in(&self, username: &str) -> bool {
        self.login_users.contains(&string_hash(username))
    }

    pub fn query_profile(&self, username: &str) -> Result<User> {
        self.users.get(&string_hash(username)).cloned().ok_or(Error::NotFound)
    }

    /// Overwrites whichever of `password`/`name`/`mail`/`privilege` is
    /// `Some`, leaving the rest untouched, and returns the updated record.
    pub fn modify_profile(
        &mut self,
        username: &str,
        password: Option<&str>,
        name: Option<&str>,
        mail: Option<&str>,
        privilege: Option<u8>,
    ) -> Result<User> {
        let hash = string_hash(username);
        let mut user = self.users.get(&hash).cloned().ok_or(Error::NotFound)?;
        if let Some(password) = password {
            user.password = FixedString::new(password)?;
        }
        if let Some(name) = name {
            user.name = FixedString::new(name)?;
        }
        if let Some(mail) = mail {
            user.mail = FixedString::new(mail)?;
        }
        if let Some(privilege) = privilege {
            user.privilege = privilege;
        }
        self.users.insert(hash, user.clone())?;
        Ok(user)
    }

    // ---------------------------------------------------------------
    // Trains
    // ---------------------------------------------------------------

    /// Adds an unreleased train. Fails with `DuplicateKey` if `train.id`
    /// is already registered.
    pub fn add_train(&mut self, train: Train) -> Result<u32> {
        let hash = string_hash(train.id.as_str());
        if self.trains_state.contains_key(&hash) {
            return Err(Error::DuplicateKey);
        }
        let train_index = self.train_id_array.push(train.id)? as u32;
        let train_heap_index = self.trains_heap.write(&train.to_bytes())?;
        self.trains_state.insert(
            hash,
            TrainState { train_index, train_heap_index, seat_heap_index: 0, released: false },
        )?;
        Ok(train_index)
    }

    fn train_state(&self, train_id: &str) -> Result<TrainState> {
        self.trains_state.find(&string_hash(train_id))
    }

    pub fn query_train(&self, train_id: &str) -> Result<Train> {
        let state = self.train_state(train_id)?;
        let bytes = self.trains_heap.read_full(state.train_heap_index)?;
        Ok(Train::decode(&bytes))
    }

    /// Removes an unreleased train. A released train's heap records are
    /// never reclaimed by this call; garbage-collecting `trains_heap`/
    /// `seats_heap` entries for deleted trains is left undefined (see
    /// `DESIGN.md`).
    pub fn delete_train(&mut self, train_id: &str) -> Result<()> {
        let hash = string_hash(train_id);
        let state = self.trains_state.find(&hash)?;
        if state.released {
            return Err(Error::InvalidArgument("cannot delete a released train".into()));
        }
        self.trains_state.remove(&hash)?;
        Ok(())
    }

    /// Publishes a train for sale: allocates its seat matrix and populates
    /// `stations_map` with one `TrainLite` row per stop.
    pub fn release_train(&mut self, train_id: &str) -> Result<()> {
        let hash = string_hash(train_id);
        let mut state = self.trains_state.find(&hash)?;
        if state.released {
            return Err(Error::InvalidArgument("train already released".into()));
        }
        let train_bytes = self.trains_heap.read_full(state.train_heap_index)?;
        let train = Train::decode(&train_bytes);

        let seat_heap_index = self.seats_heap.write(&SeatMatrix::new(train.seat_count).to_bytes())?;

        let mut prefix_price = 0u32;
        for position in 0..train.station_count as usize {
            if position > 0 {
                prefix_price = train.prefix_prices[position];
            }
            let lite = TrainLite {
                station_position: position as u8,
                prefix_price,
                arrive_minute: train.arrive_minutes[position],
                leave_minute: train.leave_minutes[position],
                sale_start: train.sale_start,
                sale_end: train.sale_end,
            };
            let station_hash = string_hash(train.stations[position].as_str());
            self.stations_map.insert((station_hash, state.train_index), lite)?;
        }

        state.released = true;
        state.seat_heap_index = seat_heap_index;
        self.trains_state.modify(&hash, state)?;
        Ok(())
    }

    fn station_position(train: &Train, station: &str) -> Result<u8> {
        train.stations[..train.station_count as usize]
            .iter()
            .position(|s| s.as_str() == station)
            .map(|p| p as u8)
            .ok_or(Error::NotFound)
    }

    // ---------------------------------------------------------------
    // Orders / seat inventory
    // ---------------------------------------------------------------

    /// Reads the remaining-seats slice for one sale day.
    fn read_day(&self, seat_heap_index: u64, day: usize) -> Result<Vec<u16>> {
        let bytes = self
            .seats_heap
            .read(seat_heap_index, SeatMatrix::day_offset(day), SeatMatrix::day_slice_size())?;
        Ok(SeatMatrix::decode_day(&bytes))
    }

    fn write_day(&self, seat_heap_index: u64, day: usize, seats: &[u16]) -> Result<()> {
        self.seats_heap
            .update(seat_heap_index, SeatMatrix::day_offset(day), &SeatMatrix::encode_day(seats))
    }

    fn min_available(day_seats: &[u16], from: u8, to: u8) -> u16 {
        day_seats[from as usize..to as usize].iter().copied().min().unwrap_or(0)
    }

    fn adjust_segment(day_seats: &mut [u16], from: u8, to: u8, delta: i32) {
        for seat in &mut day_seats[from as usize..to as usize] {
            *seat = (*seat as i32 + delta) as u16;
        }
    }

    /// Buys (or, if `allow_queue`, queues) a ticket: if the requested
    /// segment doesn't have enough seats on `date` and `allow_queue` is
    /// set, the order is recorded `Pending` in `train_unit_map` rather
    /// than rejected outright.
    pub fn buy_ticket(
        &mut self,
        username: &str,
        train_id: &str,
        date: DateTime,
        from_station: &str,
        to_station: &str,
        seat_count: u16,
        allow_queue: bool,
    ) -> Result<Order> {
        if !self.is_logged_in(username) {
            return Err(Error::Unauthorized);
        }
        let user_hash = string_hash(username);
        let state = self.train_state(train_id)?;
        if !state.released {
            return Err(Error::InvalidArgument("train not released".into()));
        }
        let train_bytes = self.trains_heap.read_full(state.train_heap_index)?;
        let train = Train::decode(&train_bytes);

        let from = Self::station_position(&train, from_station)?;
        let to = Self::station_position(&train, to_station)?;
        if from >= to {
            return Err(Error::InvalidArgument("from_station must precede to_station".into()));
        }
        if seat_count > train.seat_count {
            return Err(Error::InvalidArgument("seat_count exceeds train capacity".into()));
        }

        let day = (date.at_midnight() - train.sale_start.at_midnight()) / (24 * 60);
        if day < 0 || day as usize >= super::train::SALE_WINDOW_DAYS {
            return Err(Error::InvalidArgument("date outside sale window".into()));
        }

        let price = (train.prefix_prices[to as usize] - train.prefix_prices[from as usize]) * seat_count as u32;

        let mut day_seats = self.read_day(state.seat_heap_index, day as usize)?;
        let available = Self::min_available(&day_seats, from, to);

        let status = if available >= seat_count {
            Self::adjust_segment(&mut day_seats, from, to, -(seat_count as i32));
            self.write_day(state.seat_heap_index, day as usize, &day_seats)?;
            OrderStatus::Success
        } else if allow_queue {
            OrderStatus::Pending
        } else {
            return Err(Error::InvalidArgument("not enough seats available".into()));
        };

        let serial = self.next_serial();
        let order = Order {
            user_hash,
            train_index: state.train_index,
            departure_day: day as u16,
            from_station: from,
            to_station: to,
            seat_count,
            price,
            status,
            order_serial: serial,
        };
        let order_index = self.orders_heap.write(&order.to_bytes())?;
        self.user_orders_map.insert((user_hash, order_index as u32), order_index as u32)?;
        if status == OrderStatus::Pending {
            self.train_unit_map
                .insert((state.train_index, day as u16, serial), order_index as u32)?;
        }
        Ok(order)
    }

    /// Lists a user's orders in reverse-chronological order (most recent
    /// first). `user_orders_map` itself is iterated ascending (insertion
    /// order) and reversed here at the call site.
    pub fn query_ticket(&self, username: &str) -> Result<Vec<Order>> {
        let user_hash = string_hash(username);
        let mut order_indices = Vec::new();
        self.user_orders_map
            .search(&(user_hash, u32::MIN), &(user_hash, u32::MAX), &mut order_indices)?;
        let mut orders = Vec::with_capacity(order_indices.len());
        for index in order_indices {
            orders.push(Order::decode(&self.orders_heap.read_full(index as u64)?));
        }
        orders.reverse();
        Ok(orders)
    }

    /// Refunds the user's `nth`-most-recent order (1-based), restoring
    /// seats for a `Success` order and promoting queued orders that now
    /// fit, oldest-first.
    pub fn refund_ticket(&mut self, username: &str, nth: usize) -> Result<()> {
        if nth == 0 {
            return Err(Error::InvalidArgument("nth is 1-based".into()));
        }
        let user_hash = string_hash(username);
        let mut order_indices = Vec::new();
        self.user_orders_map
            .search(&(user_hash, u32::MIN), &(user_hash, u32::MAX), &mut order_indices)?;
        order_indices.reverse();
        let order_index = *order_indices.get(nth - 1).ok_or(Error::NotFound)? as u64;

        let mut order = Order::decode(&self.orders_heap.read_full(order_index)?);
        match order.status {
            OrderStatus::Refunded => return Err(Error::InvalidArgument("order already refunded".into())),
            OrderStatus::Pending => {
                self.train_unit_map
                    .remove(&(order.train_index, order.departure_day, order.order_serial))?;
            }
            OrderStatus::Success => {
                let hash = self.train_id_array.get(order.train_index as usize).cloned();
                let train_id = hash.ok_or(Error::NotFound)?;
                let state = self.train_state(train_id.as_str())?;
                let mut day_seats = self.read_day(state.seat_heap_index, order.departure_day as usize)?;
                Self::adjust_segment(&mut day_seats, order.from_station, order.to_station, order.seat_count as i32);
                self.write_day(state.seat_heap_index, order.departure_day as usize, &day_seats)?;
                self.promote_pending(state.train_index, order.departure_day, &day_seats)?;
            }
        }
        order.status = OrderStatus::Refunded;
        self.orders_heap.update(order_index, 0, &order.to_bytes())?;
        Ok(())
    }

    /// Walks `train_unit_map`'s `(train_index, departure_day, *)` range in
    /// ascending `order_serial` (FIFO) order, promoting queued orders to
    /// `Success` while there is room, stopping at the first one that still
    /// doesn't fit; this is a queue-draining pass, not an exhaustive
    /// best-fit search.
    fn promote_pending(&mut self, train_index: u32, departure_day: u16, seats_in: &[u16]) -> Result<()> {
        let mut day_seats = seats_in.to_vec();
        let mut pending_orders = Vec::new();
        self.train_unit_map.search(
            &(train_index, departure_day, u32::MIN),
            &(train_index, departure_day, u32::MAX),
            &mut pending_orders,
        )?;

        for order_index in pending_orders {
            let mut order = Order::decode(&self.orders_heap.read_full(order_index as u64)?);
            if Self::min_available(&day_seats, order.from_station, order.to_station) < order.seat_count {
                break;
            }
            Self::adjust_segment(&mut day_seats, order.from_station, order.to_station, -(order.seat_count as i32));
            order.status = OrderStatus::Success;
            self.orders_heap.update(order_index as u64, 0, &order.to_bytes())?;
            self.train_unit_map
                .remove(&(train_index, departure_day, order.order_serial))?;
        }

        let state_hash = {
            let train_id = self.train_id_array.get(train_index as usize).cloned().ok_or(Error::NotFound)?;
            string_hash(train_id.as_str())
        };
        let state = self.trains_state.find(&state_hash)?;
        self.write_day(state.seat_heap_index, departure_day as usize, &day_seats)
    }

    /// Flushes every backing file; safe to call repeatedly.
    pub fn flush(&self) -> Result<()> {
        self.trains_state.flush()?;
        self.stations_map.flush()?;
        self.train_unit_map.flush()?;
        self.user_orders_map.flush()?;
        self.trains_heap.flush()?;
        self.seats_heap.flush()?;
        self.orders_heap.flush()?;
        self.train_id_array.close()?;
        self.users.close()
    }
}
