use clap::Subcommand;
use pomocoin_core::catalog::{items_by_room, RoomType};
use pomocoin_core::{Database, PurchaseOutcome};

use super::{print_json, CliResult};

fn parse_room(s: &str) -> Result<RoomType, String> {
    RoomType::parse(s).ok_or_else(|| format!("expected garden, office or bedroom, got {s}"))
}

#[derive(Subcommand)]
pub enum RoomsAction {
    /// List the items of one room, or of every room
    List {
        #[arg(value_parser = parse_room)]
        room: Option<RoomType>,
        #[arg(long)]
        json: bool,
    },
    /// Buy a room item
    Buy {
        /// Item ID
        id: u32,
    },
    /// Decoration progress per room
    Progress {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: RoomsAction) -> CliResult {
    let db = Database::open()?;

    match action {
        RoomsAction::List { room, json } => {
            let rooms = match room {
                Some(room) => vec![room],
                None => RoomType::ALL.to_vec(),
            };
            let owned = db.purchased_item_ids()?;
            if json {
                let rows: Vec<_> = rooms
                    .iter()
                    .flat_map(|room| items_by_room(*room))
                    .map(|item| {
                        serde_json::json!({
                            "item": item,
                            "purchased": owned.contains(&item.id),
                        })
                    })
                    .collect();
                return print_json(&rows);
            }
            for room in rooms {
                println!("{} {}", room.emoji(), room.label());
                for item in items_by_room(room) {
                    let state = if owned.contains(&item.id) {
                        "owned".to_string()
                    } else {
                        format!("{} coins", item.price)
                    };
                    println!(
                        "  #{:<3} {} {:<20} {:>10}  {}",
                        item.id, item.emoji, item.name, state, item.description
                    );
                }
            }
        }
        RoomsAction::Buy { id } => match db.purchase_item(id)? {
            PurchaseOutcome::Success(item) => {
                println!("Bought {} {} for the {}", item.emoji, item.name, item.room.label());
                let progress = db.room_progress(item.room)?;
                if progress.is_complete() {
                    println!("The {} is complete!", item.room.label());
                }
            }
            PurchaseOutcome::AlreadyOwned => println!("Item {id} is already owned"),
            PurchaseOutcome::InsufficientCoins => return Err("not enough coins".into()),
            PurchaseOutcome::NotFound => return Err(format!("item {id} not found").into()),
        },
        RoomsAction::Progress { json } => {
            let progress = RoomType::ALL
                .iter()
                .map(|room| db.room_progress(*room))
                .collect::<Result<Vec<_>, _>>()?;
            let summary = db.rooms_summary()?;
            if json {
                return print_json(&serde_json::json!({
                    "rooms": progress,
                    "summary": summary,
                }));
            }
            for p in &progress {
                println!(
                    "{} {:<8} {}/{} ({}%)",
                    p.room.emoji(),
                    p.room.label(),
                    p.purchased_count,
                    p.total_count,
                    p.percentage
                );
            }
            println!(
                "total: {}/{} items, {}/{} rooms complete",
                summary.purchased_items,
                summary.total_items,
                summary.completed_rooms,
                summary.total_rooms
            );
        }
    }
    Ok(())
}
