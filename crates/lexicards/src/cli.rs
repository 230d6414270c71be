// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use lexicards_core::CardId;
use lexicards_core::Engine;
use lexicards_core::ErrorReport;
use lexicards_core::Fallible;
use lexicards_core::FolderId;
use lexicards_core::OffsetClock;
use lexicards_core::SystemClock;
use lexicards_core::UserId;
use lexicards_core::VocabId;

use crate::cmd::AppEngine;
use crate::cmd::due::print_due;
use crate::cmd::folder::add_card;
use crate::cmd::folder::create_folder;
use crate::cmd::review::Answer;
use crate::cmd::review::review_card;
use crate::cmd::review::review_input;
use crate::cmd::stats::LevelArg;
use crate::cmd::stats::print_insights;
use crate::cmd::stats::print_stats;
use crate::cmd::sweep::freeze_card;
use crate::cmd::sweep::sweep_user;
use crate::cmd::sync::apply_sync;
use crate::cmd::sync::preview_sync;
use crate::db::Database;
use crate::serve::server::start_server;
use crate::settings::load_config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database.
    #[arg(long, global = true, default_value = "lexicards.sqlite3")]
    db: PathBuf,
    /// Path to a TOML config file. Defaults to `lexicards.toml` next to the
    /// database, if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Shift the clock by this many days.
    #[arg(long, global = true, default_value_t = 0, allow_negative_numbers = true)]
    offset_days: i64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a folder.
    Folder {
        #[arg(long)]
        user: i64,
        name: String,
        /// Parent folder, for a subfolder.
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Create a card on first exposure to a vocabulary item.
    Add {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        vocab: i64,
        #[arg(long)]
        folder: i64,
    },
    /// Submit a review.
    Review {
        card: i64,
        answer: Answer,
        /// easy, medium, or hard.
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        response_ms: Option<u64>,
        #[arg(long)]
        study_secs: Option<u64>,
    },
    /// Print a user's review queue.
    Due {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show what synchronizing a folder would change.
    SyncPreview { folder: i64 },
    /// Synchronize a folder's timers.
    Sync { folder: i64 },
    /// Move a user's cards through the overdue window.
    Sweep {
        #[arg(long)]
        user: i64,
    },
    /// Pause a card.
    Freeze {
        card: i64,
        #[arg(long)]
        hours: i64,
    },
    /// Print a user's study statistics.
    Stats {
        #[arg(long)]
        user: i64,
    },
    /// Print a learning report and a session size recommendation.
    Insights {
        #[arg(long)]
        user: i64,
        /// Report window.
        #[arg(long, default_value_t = 30)]
        days: u32,
        #[arg(long, default_value_t = LevelArg::Intermediate)]
        level: LevelArg,
        /// Available study time.
        #[arg(long, default_value_t = 30)]
        minutes: u32,
    },
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), &cli.db)?;
    let db_path = cli
        .db
        .to_str()
        .ok_or_else(|| ErrorReport::new("invalid path"))?;
    let db = Database::new(db_path)?;
    let clock = OffsetClock::days(SystemClock, cli.offset_days)?;
    if !clock.offset().is_zero() {
        log::debug!("Clock offset by {} days.", clock.offset().num_days());
    }
    let engine: AppEngine = Engine::new(db, clock, config);
    match cli.command {
        Command::Folder { user, name, parent } => {
            create_folder(&engine, UserId::new(user), &name, parent.map(FolderId::new))
        }
        Command::Add {
            user,
            vocab,
            folder,
        } => add_card(
            &engine,
            UserId::new(user),
            VocabId::new(vocab),
            FolderId::new(folder),
        ),
        Command::Review {
            card,
            answer,
            difficulty,
            response_ms,
            study_secs,
        } => {
            let input = review_input(answer, difficulty, response_ms, study_secs);
            review_card(&engine, CardId::new(card), &input)
        }
        Command::Due { user, limit } => print_due(&engine, UserId::new(user), limit),
        Command::SyncPreview { folder } => preview_sync(&engine, FolderId::new(folder)),
        Command::Sync { folder } => apply_sync(&engine, FolderId::new(folder)),
        Command::Sweep { user } => sweep_user(&engine, UserId::new(user)),
        Command::Freeze { card, hours } => freeze_card(&engine, CardId::new(card), hours),
        Command::Stats { user } => print_stats(&engine, UserId::new(user)),
        Command::Insights {
            user,
            days,
            level,
            minutes,
        } => print_insights(&engine, UserId::new(user), days, level, minutes),
        Command::Serve { port } => start_server(engine, port).await,
    }
}
