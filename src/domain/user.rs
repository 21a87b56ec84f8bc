//! User account records.

use crate::storage::codec::Codec;
use crate::types::FixedString;

#[derive(Clone)]
pub struct User {
    pub username: FixedString<20>,
    pub password: FixedString<30>,
    pub name: FixedString<15>,
    pub mail: FixedString<31>,
    pub privilege: u8,
}

impl Codec for User {
    const SIZE: usize =
        FixedString::<20>::SIZE + FixedString::<30>::SIZE + FixedString::<15>::SIZE + FixedString::<31>::SIZE + 1;

    fn encode(&self, buf: &mut [u8]) {
        let mut offset = 0;
        self.username.encode(&mut buf[offset..offset + FixedString::<20>::SIZE]);
        offset += FixedString::<20>::SIZE;
        self.password.encode(&mut buf[offset..offset + FixedString::<30>::SIZE]);
        offset += FixedString::<30>::SIZE;
        self.name.encode(&mut buf[offset..offset + FixedString::<15>::SIZE]);
        offset += FixedString::<15>::SIZE;
        self.mail.encode(&mut buf[offset..offset + FixedString::<31>::SIZE]);
        offset += FixedString::<31>::SIZE;
        buf[offset] = self.privilege;
    }

    fn decode(buf: &[u8]) -> Self {
        let mut offset = 0;
        let username = FixedString::<20>::decode(&buf[offset..offset + FixedString::<20>::SIZE]);
        offset += FixedString::<20>::SIZE;
        let password = FixedString::<30>::decode(&buf[offset..offset + FixedString::<30>::SIZE]);
        offset += FixedString::<30>::SIZE;
        let name = FixedString::<15>::decode(&buf[offset..offset + FixedString::<15>::SIZE]);
        offset += FixedString::<15>::SIZE;
        let mail = FixedString::<31>::decode(&buf[offset..offset + FixedString::<31>::SIZE]);
        offset += FixedString::<31>::SIZE;
        let privilege = buf[offset];
        Self { username, password, name, mail, privilege }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_round_trips_through_codec() {
        let user = User {
            username: FixedString::new("alice").unwrap(),
            password: FixedString::new("hunter2").unwrap(),
            name: FixedString::new("Alice").unwrap(),
            mail: FixedString::new("alice@example.com").unwrap(),
            privilege: 10,
        };
        let mut buf = vec![0u8; User::SIZE];
        user.encode(&mut buf);
        let decoded = User::decode(&buf);
        assert_eq!(decoded.username.as_str(), "alice");
        assert_eq!(decoded.privilege, 10);
        assert_eq!(decoded.mail.as_str(), "alice@example.com");
    }
}
