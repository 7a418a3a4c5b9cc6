//! Decoration items for the three rooms.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Garden,
    Office,
    Bedroom,
}

impl RoomType {
    pub const ALL: [RoomType; 3] = [RoomType::Garden, RoomType::Office, RoomType::Bedroom];

    pub fn label(self) -> &'static str {
        match self {
            RoomType::Garden => "Garden",
            RoomType::Office => "Office",
            RoomType::Bedroom => "Bedroom",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            RoomType::Garden => "🌳",
            RoomType::Office => "💼",
            RoomType::Bedroom => "🛏️",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "garden" => Some(RoomType::Garden),
            "office" => Some(RoomType::Office),
            "bedroom" => Some(RoomType::Bedroom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomItem {
    pub id: u32,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub price: u32,
    pub room: RoomType,
}

const fn item(
    id: u32,
    name: &'static str,
    emoji: &'static str,
    description: &'static str,
    price: u32,
    room: RoomType,
) -> RoomItem {
    RoomItem {
        id,
        name,
        emoji,
        description,
        price,
        room,
    }
}

const GARDEN: &[RoomItem] = &[
    item(1, "Rosebush", "🌹", "Beautiful red roses", 80, RoomType::Garden),
    item(2, "Tree", "🌳", "A leafy tree", 120, RoomType::Garden),
    item(3, "Bench", "🪑", "Garden bench", 100, RoomType::Garden),
    item(4, "Fountain", "⛲", "Decorative fountain", 150, RoomType::Garden),
    item(5, "Flower pots", "🪴", "Pots full of flowers", 60, RoomType::Garden),
    item(6, "Sunflowers", "🌻", "A patch of sunflowers", 70, RoomType::Garden),
    item(7, "Street lamp", "💡", "Vintage lamp post", 90, RoomType::Garden),
    item(8, "Path", "🛤️", "Stone path", 50, RoomType::Garden),
];

const OFFICE: &[RoomItem] = &[
    item(11, "Laptop", "💻", "A powerful computer", 150, RoomType::Office),
    item(12, "Chair", "🪑", "Ergonomic chair", 120, RoomType::Office),
    item(13, "Desk lamp", "🔦", "Desk lamp", 80, RoomType::Office),
    item(14, "Plant", "🌿", "Decorative plant", 60, RoomType::Office),
    item(15, "Books", "📚", "Bookshelf", 100, RoomType::Office),
    item(16, "Coffee", "☕", "Cup of coffee", 50, RoomType::Office),
];

const BEDROOM: &[RoomItem] = &[
    item(21, "Bed", "🛏️", "Comfortable bed", 150, RoomType::Bedroom),
    item(22, "Nightstand", "🛋️", "Bedside table", 90, RoomType::Bedroom),
    item(23, "Lamp", "💡", "Bedside lamp", 70, RoomType::Bedroom),
    item(24, "Painting", "🖼️", "Decorative painting", 80, RoomType::Bedroom),
    item(25, "Rug", "🧶", "Soft rug", 100, RoomType::Bedroom),
    item(26, "Window", "🪟", "Window with curtains", 110, RoomType::Bedroom),
    item(27, "Clock", "🕐", "Wall clock", 60, RoomType::Bedroom),
];

pub fn items_by_room(room: RoomType) -> &'static [RoomItem] {
    match room {
        RoomType::Garden => GARDEN,
        RoomType::Office => OFFICE,
        RoomType::Bedroom => BEDROOM,
    }
}

pub fn all_items() -> impl Iterator<Item = &'static RoomItem> {
    RoomType::ALL
        .into_iter()
        .flat_map(|room| items_by_room(room).iter())
}

pub fn item_by_id(id: u32) -> Option<&'static RoomItem> {
    all_items().find(|i| i.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_sizes() {
        assert_eq!(items_by_room(RoomType::Garden).len(), 8);
        assert_eq!(items_by_room(RoomType::Office).len(), 6);
        assert_eq!(items_by_room(RoomType::Bedroom).len(), 7);
        assert_eq!(all_items().count(), 21);
    }

    #[test]
    fn lookup_by_id() {
        let fountain = item_by_id(4).unwrap();
        assert_eq!(fountain.price, 150);
        assert_eq!(fountain.room, RoomType::Garden);
        assert!(item_by_id(30).is_none());
    }

    #[test]
    fn parse_room_names() {
        assert_eq!(RoomType::parse("Office"), Some(RoomType::Office));
        assert_eq!(RoomType::parse("kitchen"), None);
    }
}
