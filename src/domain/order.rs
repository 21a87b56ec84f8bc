//! Order records and their lifecycle status.

use crate::storage::codec::Codec;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum OrderStatus {
    Success,
    Pending,
    Refunded,
}

impl OrderStatus {
    fn to_u8(self) -> u8 {
        match self {
            OrderStatus::Success => 0,
            OrderStatus::Pending => 1,
            OrderStatus::Refunded => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => OrderStatus::Success,
            1 => OrderStatus::Pending,
            2 => OrderStatus::Refunded,
            other => panic!("malformed order status byte {}", other),
        }
    }
}

/// One purchase or purchase attempt, stored whole in `orders_heap`.
/// `order_serial` is the monotonically increasing insertion order used to
/// break ties in `train_unit_map`'s FIFO pending-queue promotion.
#[derive(Clone, Copy)]
pub struct Order {
    pub user_hash: u64,
    pub train_index: u32,
    pub departure_day: u16,
    pub from_station: u8,
    pub to_station: u8,
    pub seat_count: u16,
    pub price: u32,
    pub status: OrderStatus,
    pub order_serial: u32,
}

impl Codec for Order {
    const SIZE: usize = 8 + 4 + 2 + 1 + 1 + 2 + 4 + 1 + 4;

    fn encode(&self, buf: &mut [u8]) {
        let mut offset = 0;
        self.user_hash.encode(&mut buf[offset..offset + 8]);
        offset += 8;
        self.train_index.encode(&mut buf[offset..offset + 4]);
        offset += 4;
        self.departure_day.encode(&mut buf[offset..offset + 2]);
        offset += 2;
        buf[offset] = self.from_station;
        offset += 1;
        buf[offset] = self.to_station;
        offset += 1;
        self.seat_count.encode(&mut buf[offset..offset + 2]);
        offset += 2;
        self.price.encode(&mut buf[offset..offset + 4]);
        offset += 4;
        buf[offset] = self.status.to_u8();
        offset += 1;
        self.order_serial.encode(&mut buf[offset..offset + 4]);
    }

    fn decode(buf: &[u8]) -> Self {
        let mut offset = 0;
        let user_hash = u64::decode(&buf[offset..offset + 8]);
        offset += 8;
        let train_index = u32::decode(&buf[offset..offset + 4]);
        offset += 4;
        let departure_day = u16::decode(&buf[offset..offset + 2]);
        offset += 2;
        let from_station = buf[offset];
        offset += 1;
        let to_station = buf[offset];
        offset += 1;
        let seat_count = u16::decode(&buf[offset..offset + 2]);
        offset += 2;
        let price = u32::decode(&buf[offset..offset + 4]);
        offset += 4;
        let status = OrderStatus::from_u8(buf[offset]);
        offset += 1;
        let order_serial = u32::decode(&buf[offset..offset + 4]);
        Self {
            user_hash,
            train_index,
            departure_day,
            from_station,
            to_station,
            seat_count,
            price,
            status,
            order_serial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_round_trips_through_codec() {
        let order = Order {
            user_hash: 42,
            train_index: 7,
            departure_day: 10,
            from_station: 1,
            to_station: 5,
            seat_count: 3,
            price: 1500,
            status: OrderStatus::Pending,
            order_serial: 99,
        };
        let mut buf = vec![0u8; Order::SIZE];
        order.encode(&mut buf);
        let decoded = Order::decode(&buf);
        assert_eq!(decoded.user_hash, 42);
        assert_eq!(decoded.status, OrderStatus::Pending);
        assert_eq!(decoded.order_serial, 99);
    }
}
