//! Train records and the day-by-day seat matrix.

use crate::storage::codec::Codec;
use crate::types::{DateTime, FixedString};

/// Maximum stations a single train may stop at.
pub const MAX_STATIONS: usize = 100;
/// Sale window length in days (2025-06-01 through 2025-08-31).
pub const SALE_WINDOW_DAYS: usize = 92;

/// A train's static timetable, stored whole in `system::TicketingEngine`'s
/// `trains_heap`. Not a B+-tree value: its encoded size (~4 KB) is sized
/// for a dedicated record heap, not a B+-tree page.
#[derive(Clone)]
pub struct Train {
    pub id: FixedString<20>,
    pub station_count: u8,
    pub seat_count: u16,
    pub stations: Vec<FixedString<30>>,
    pub prefix_prices: Vec<u32>,
    pub arrive_minutes: Vec<i32>,
    pub leave_minutes: Vec<i32>,
    pub sale_start: DateTime,
    pub sale_end: DateTime,
    pub kind: u8,
}

impl Train {
    fn padded<T: Clone + Default>(values: &[T], len: usize) -> Vec<T> {
        let mut out = values.to_vec();
        out.resize(len, T::default());
        out
    }

    pub fn new(
        id: FixedString<20>,
        stations: Vec<FixedString<30>>,
        prefix_prices: Vec<u32>,
        arrive_minutes: Vec<i32>,
        leave_minutes: Vec<i32>,
        seat_count: u16,
        sale_start: DateTime,
        sale_end: DateTime,
        kind: u8,
    ) -> Self {
        let station_count = stations.len() as u8;
        Self {
            id,
            station_count,
            seat_count,
            stations: Self::padded(&stations, MAX_STATIONS),
            prefix_prices: Self::padded(&prefix_prices, MAX_STATIONS),
            arrive_minutes: Self::padded(&arrive_minutes, MAX_STATIONS),
            leave_minutes: Self::padded(&leave_minutes, MAX_STATIONS),
            sale_start,
            sale_end,
            kind,
        }
    }
}

impl Codec for Train {
    const SIZE: usize = FixedString::<20>::SIZE
        + 1
        + 2
        + MAX_STATIONS * FixedString::<30>::SIZE
        + MAX_STATIONS * 4
        + MAX_STATIONS * 4
        + MAX_STATIONS * 4
        + DateTime::SIZE
        + DateTime::SIZE
        + 1;

    fn encode(&self, buf: &mut [u8]) {
        let mut offset = 0;
        self.id.encode(&mut buf[offset..offset + FixedString::<20>::SIZE]);
        offset += FixedString::<20>::SIZE;
        buf[offset] = self.station_count;
        offset += 1;
        self.seat_count.encode(&mut buf[offset..offset + 2]);
        offset += 2;
        for station in &self.stations {
            station.encode(&mut buf[offset..offset + FixedString::<30>::SIZE]);
            offset += FixedString::<30>::SIZE;
        }
        for price in &self.prefix_prices {
            price.encode(&mut buf[offset..offset + 4]);
            offset += 4;
        }
        for minute in &self.arrive_minutes {
            minute.encode(&mut buf[offset..offset + 4]);
            offset += 4;
        }
        for minute in &self.leave_minutes {
            minute.encode(&mut buf[offset..offset + 4]);
            offset += 4;
        }
        self.sale_start.encode(&mut buf[offset..offset + DateTime::SIZE]);
        offset += DateTime::SIZE;
        self.sale_end.encode(&mut buf[offset..offset + DateTime::SIZE]);
        offset += DateTime::SIZE;
        buf[offset] = self.kind;
    }

    fn decode(buf: &[u8]) -> Self {
        let mut offset = 0;
        let id = FixedString::<20>::decode(&buf[offset..offset + FixedString::<20>::SIZE]);
        offset += FixedString::<20>::SIZE;
        let station_count = buf[offset];
        offset += 1;
        let seat_count = u16::decode(&buf[offset..offset + 2]);
        offset += 2;
        let mut stations = Vec::with_capacity(MAX_STATIONS);
        for _ in 0..MAX_STATIONS {
            stations.push(FixedString::<30>::decode(&buf[offset..offset + FixedString::<30>::SIZE]));
            offset += FixedString::<30>::SIZE;
        }
        let mut prefix_prices = Vec::with_capacity(MAX_STATIONS);
        for _ in 0..MAX_STATIONS {
            prefix_prices.push(u32::decode(&buf[offset..offset + 4]));
            offset += 4;
        }
        let mut arrive_minutes = Vec::with_capacity(MAX_STATIONS);
        for _ in 0..MAX_STATIONS {
            arrive_minutes.push(i32::decode(&buf[offset..offset + 4]));
            offset += 4;
        }
        let mut leave_minutes = Vec::with_capacity(MAX_STATIONS);
        for _ in 0..MAX_STATIONS {
            leave_minutes.push(i32::decode(&buf[offset..offset + 4]));
            offset += 4;
        }
        let sale_start = DateTime::decode(&buf[offset..offset + DateTime::SIZE]);
        offset += DateTime::SIZE;
        let sale_end = DateTime::decode(&buf[offset..offset + DateTime::SIZE]);
        offset += DateTime::SIZE;
        let kind = buf[offset];
        Self {
            id,
            station_count,
            seat_count,
            stations,
            prefix_prices,
            arrive_minutes,
            leave_minutes,
            sale_start,
            sale_end,
            kind,
        }
    }
}

/// Per-day, per-segment remaining seat counts for one train, stored whole
/// in `seats_heap`. `release_train` allocates one of these; `buy_ticket`
/// and `refund_ticket` rewrite a single `[u16; MAX_STATIONS - 1]`
/// day-slice via `RecordHeap::update`, never the whole record.
#[derive(Clone)]
pub struct SeatMatrix {
    pub remaining: Vec<Vec<u16>>,
}

impl SeatMatrix {
    pub fn new(seat_count: u16) -> Self {
        Self {
            remaining: vec![vec![seat_count; MAX_STATIONS - 1]; SALE_WINDOW_DAYS],
        }
    }

    /// Byte offset of day `day`'s slice within the encoded record; used by
    /// callers that want a single-day `RecordHeap::update` instead of
    /// rewriting the whole matrix.
    pub fn day_offset(day: usize) -> usize {
        day * (MAX_STATIONS - 1) * 2
    }

    pub fn day_slice_size() -> usize {
        (MAX_STATIONS - 1) * 2
    }

    pub fn encode_day(day_seats: &[u16]) -> Vec<u8> {
        let mut buf = vec![0u8; day_seats.len() * 2];
        for (i, seat) in day_seats.iter().enumerate() {
            seat.encode(&mut buf[i * 2..i * 2 + 2]);
        }
        buf
    }

    pub fn decode_day(buf: &[u8]) -> Vec<u16> {
        buf.chunks(2).map(u16::decode).collect()
    }
}

impl Codec for SeatMatrix {
    const SIZE: usize = SALE_WINDOW_DAYS * (MAX_STATIONS - 1) * 2;

    fn encode(&self, buf: &mut [u8]) {
        let slice_size = Self::day_slice_size();
        for (day, seats) in self.remaining.iter().enumerate() {
            let encoded = Self::encode_day(seats);
            buf[day * slice_size..(day + 1) * slice_size].copy_from_slice(&encoded);
        }
    }

    fn decode(buf: &[u8]) -> Self {
        let slice_size = Self::day_slice_size();
        let mut remaining = Vec::with_capacity(SALE_WINDOW_DAYS);
        for day in 0..SALE_WINDOW_DAYS {
            remaining.push(Self::decode_day(&buf[day * slice_size..(day + 1) * slice_size]));
        }
        Self { remaining }
    }
}

/// Lifecycle bookkeeping for one train, the value half of
/// `trains_state: BPlusTree<u64, TrainState>` keyed by
/// `crate::util::string_hash(train.id)`. `train_index` (the train's
/// position in `train_id_array`) is carried here too, because
/// `stations_map`/`train_unit_map` keys are built from it and every
/// other lookup starts from the train id.
#[derive(Clone, Copy)]
pub struct TrainState {
    pub train_index: u32,
    pub train_heap_index: u64,
    pub seat_heap_index: u64,
    pub released: bool,
}

impl Codec for TrainState {
    const SIZE: usize = 4 + 8 + 8 + 1;

    fn encode(&self, buf: &mut [u8]) {
        self.train_index.encode(&mut buf[0..4]);
        self.train_heap_index.encode(&mut buf[4..12]);
        self.seat_heap_index.encode(&mut buf[12..20]);
        buf[20] = self.released as u8;
    }

    fn decode(buf: &[u8]) -> Self {
        Self {
            train_index: u32::decode(&buf[0..4]),
            train_heap_index: u64::decode(&buf[4..12]),
            seat_heap_index: u64::decode(&buf[12..20]),
            released: buf[20] != 0,
        }
    }
}

/// A single station stop precomputed during `release_train`, the value
/// half of `stations_map: BPlusTree<(u64, u32), TrainLite>` keyed by
/// `(string_hash(station), train_index)`. Carries everything a transfer
/// search needs about one stop without re-reading the full `Train` record
/// from `trains_heap`.
#[derive(Clone, Copy)]
pub struct TrainLite {
    pub station_position: u8,
    pub prefix_price: u32,
    pub arrive_minute: i32,
    pub leave_minute: i32,
    pub sale_start: DateTime,
    pub sale_end: DateTime,
}

impl Codec for TrainLite {
    const SIZE: usize = 1 + 4 + 4 + 4 + DateTime::SIZE + DateTime::SIZE;

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = self.station_position;
        self.prefix_price.encode(&mut buf[1..5]);
        self.arrive_minute.encode(&mut buf[5..9]);
        self.leave_minute.encode(&mut buf[9..13]);
        self.sale_start.encode(&mut buf[13..13 + DateTime::SIZE]);
        self.sale_end
            .encode(&mut buf[13 + DateTime::SIZE..13 + 2 * DateTime::SIZE]);
    }

    fn decode(buf: &[u8]) -> Self {
        Self {
            station_position: buf[0],
            prefix_price: u32::decode(&buf[1..5]),
            arrive_minute: i32::decode(&buf[5..9]),
            leave_minute: i32::decode(&buf[9..13]),
            sale_start: DateTime::decode(&buf[13..13 + DateTime::SIZE]),
            sale_end: DateTime::decode(&buf[13 + DateTime::SIZE..13 + 2 * DateTime::SIZE]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_round_trips_through_codec() {
        let train = Train::new(
            FixedString::new("G1234").unwrap(),
            vec![FixedString::new("Beijing").unwrap(), FixedString::new("Shanghai").unwrap()],
            vec![0, 553],
            vec![0, 300],
            vec![10, i32::MAX],
            1200,
            DateTime::from_parts(6, 1, 0, 0).unwrap(),
            DateTime::from_parts(6, 30, 0, 0).unwrap(),
            1,
        );
        let mut buf = vec![0u8; Train::SIZE];
        train.encode(&mut buf);
        let decoded = Train::decode(&buf);
        assert_eq!(decoded.id.as_str(), "G1234");
        assert_eq!(decoded.station_count, 2);
        assert_eq!(decoded.seat_count, 1200);
        assert_eq!(decoded.stations[0].as_str(), "Beijing");
        assert_eq!(decoded.prefix_prices[1], 553);
    }

    #[test]
    fn seat_matrix_day_slice_updates_independently() {
        let matrix = SeatMatrix::new(50);
        let mut buf = vec![0u8; SeatMatrix::SIZE];
        matrix.encode(&mut buf);

        let offset = SeatMatrix::day_offset(10);
        let mut day_ten: Vec<u16> = matrix.remaining[10].clone();
        day_ten[0] = 3;
        let encoded = SeatMatrix::encode_day(&day_ten);
        buf[offset..offset + encoded.len()].copy_from_slice(&encoded);

        let decoded = SeatMatrix::decode(&buf);
        assert_eq!(decoded.remaining[10][0], 3);
        assert_eq!(decoded.remaining[9][0], 50);
    }
}
