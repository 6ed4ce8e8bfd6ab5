//! Command-line argument definitions using clap's derive API.
//!
//! Argument structs stay in this crate; each one converts into the core
//! request types ([`StepDraft`], [`StepPatch`]) so the core never sees clap.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use glowlog_core::{
    models::{StepCategory, StepDraft, StepPatch, TimeOfDay},
    schedule::{DayOfWeek, Schedule},
};
use jiff::civil::Date;

/// Glowlog keeps track of a skincare routine from the terminal.
///
/// Steps carry a weekly, cycle or interval schedule. `glow` shows what is due
/// today, records what was done or skipped and keeps linked products marked
/// as in use.
#[derive(Parser)]
#[command(version, about, name = "glow")]
pub struct Args {
    /// Path to the data file. Defaults to $XDG_DATA_HOME/glowlog/glowlog.db,
    /// or glowlog.json for the json backend
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Storage backend
    #[arg(long, global = true, value_enum, default_value_t = BackendArg::Sqlite)]
    pub backend: BackendArg,

    /// User whose routine to open (sqlite backend only)
    #[arg(long, global = true, default_value = "local")]
    pub user: String,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Day to act on (YYYY-MM-DD). Defaults to today
    #[arg(long, global = true)]
    pub date: Option<Date>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands. Without one, `glow` shows today's checklist.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage routine steps
    #[command(alias = "s")]
    Step {
        #[command(subcommand)]
        command: StepCommands,
    },
    /// Show the steps due today
    #[command(alias = "t")]
    Today(TodayArgs),
    /// Mark a step done, or undo it
    #[command(alias = "d")]
    Done(DoneArgs),
    /// Skip a step, or undo the skip
    Skip(SkipArgs),
    /// Skip everything still open in a routine
    #[command(alias = "f")]
    Finish(FinishArgs),
    /// Show how much of the day's routine is done
    #[command(alias = "p")]
    Progress,
    /// Preview the schedule for the coming days
    #[command(alias = "u")]
    Upcoming(UpcomingArgs),
    /// Manage the product shelf
    Product {
        #[command(subcommand)]
        command: ProductCommands,
    },
}

#[derive(Subcommand)]
pub enum StepCommands {
    /// Add a step to the routine
    #[command(alias = "a")]
    Add(AddStepArgs),
    /// List all steps in order
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show details of a step
    #[command(alias = "s")]
    Show(StepIdArgs),
    /// Change a step's details or schedule
    #[command(alias = "u")]
    Update(UpdateStepArgs),
    /// Remove a step and its history
    #[command(aliases = ["d", "rm"])]
    Remove(StepIdArgs),
    /// Put steps in a new order
    #[command(alias = "r")]
    Reorder(ReorderArgs),
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// Put a new product on the shelf
    #[command(alias = "a")]
    Add(AddProductArgs),
    /// List products on the shelf
    #[command(aliases = ["l", "ls"])]
    List,
}

/// Storage backend choice on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// SQLite database, one routine per user
    Sqlite,
    /// Single JSON document on this device
    Json,
}

/// Part of the day on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TimeOfDayArg {
    Morning,
    Evening,
    Both,
}

impl From<TimeOfDayArg> for TimeOfDay {
    fn from(val: TimeOfDayArg) -> Self {
        match val {
            TimeOfDayArg::Morning => TimeOfDay::Morning,
            TimeOfDayArg::Evening => TimeOfDay::Evening,
            TimeOfDayArg::Both => TimeOfDay::Both,
        }
    }
}

/// Schedule flags shared by `step add` and `step update`.
///
/// `--days` gives a weekly schedule, `--cycle` with `--cycle-days` a cycle
/// and `--every` an interval. Cycles and intervals start at `--start`, or
/// the command's date.
#[derive(ClapArgs, Default)]
pub struct ScheduleArgs {
    /// Weekdays for a weekly schedule, comma-separated (mon,wed,fri)
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["cycle", "every"])]
    pub days: Vec<DayOfWeek>,
    /// Length in days of a repeating cycle
    #[arg(long, conflicts_with = "every")]
    pub cycle: Option<u32>,
    /// Active 1-based days of the cycle, comma-separated
    #[arg(long, value_delimiter = ',', requires = "cycle")]
    pub cycle_days: Vec<u32>,
    /// Repeat every N days
    #[arg(long)]
    pub every: Option<u32>,
    /// First day of a cycle or interval (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<Date>,
}

impl ScheduleArgs {
    /// The schedule described by the flags, or `None` if none were given.
    pub fn into_schedule(self, default_start: Date) -> Option<Schedule> {
        let start = self.start.unwrap_or(default_start);
        if let Some(length) = self.cycle {
            Some(Schedule::cycle(length, self.cycle_days, start))
        } else if let Some(every) = self.every {
            Some(Schedule::interval(every, start))
        } else if !self.days.is_empty() {
            Some(Schedule::weekly(self.days))
        } else {
            None
        }
    }
}

/// Add a step. Without schedule flags the step is due every day.
#[derive(ClapArgs)]
pub struct AddStepArgs {
    /// Name of the step
    pub name: String,
    #[arg(short, long, value_enum, help = "Morning, evening or both")]
    pub time: TimeOfDayArg,
    #[arg(short, long, help = "Kind of step (cleanser, serum, sunscreen, ...)")]
    pub category: Option<StepCategory>,
    #[arg(short, long, help = "Name of the product used in this step")]
    pub product: Option<String>,
    #[arg(long, help = "Shelf ID of the linked product")]
    pub product_id: Option<String>,
    #[arg(short, long, help = "Free-form notes")]
    pub notes: Option<String>,
    #[command(flatten)]
    pub schedule: ScheduleArgs,
}

impl AddStepArgs {
    pub fn into_draft(self, today: Date) -> StepDraft {
        let schedule = self
            .schedule
            .into_schedule(today)
            .unwrap_or_else(Schedule::daily);

        let mut draft = StepDraft::new(self.name, self.time.into(), schedule);
        draft.category = self.category.unwrap_or_default();
        draft.product_name = self.product;
        draft.product_id = self.product_id;
        draft.notes = self.notes;
        draft
    }
}

/// Update a step. Only the given fields change.
#[derive(ClapArgs)]
pub struct UpdateStepArgs {
    #[arg(help = "ID of the step to update")]
    pub id: u64,
    #[arg(long, help = "New name")]
    pub name: Option<String>,
    #[arg(short, long, value_enum, help = "Morning, evening or both")]
    pub time: Option<TimeOfDayArg>,
    #[arg(short, long, help = "Kind of step")]
    pub category: Option<StepCategory>,
    #[arg(short, long, help = "Name of the product used in this step")]
    pub product: Option<String>,
    #[arg(long, help = "Shelf ID of the linked product")]
    pub product_id: Option<String>,
    #[arg(
        long,
        conflicts_with_all = ["product", "product_id"],
        help = "Unlink the product"
    )]
    pub clear_product: bool,
    #[arg(short, long, help = "Free-form notes")]
    pub notes: Option<String>,
    #[command(flatten)]
    pub schedule: ScheduleArgs,
}

impl UpdateStepArgs {
    /// Builds the patch along with a human-readable list of what it changes.
    pub fn into_patch(self, today: Date) -> (StepPatch, Vec<String>) {
        let mut changes = Vec::new();
        let mut patch = StepPatch::default();

        if let Some(name) = self.name {
            changes.push(format!("Renamed to '{name}'"));
            patch.name = Some(name);
        }
        if let Some(time) = self.time {
            let time = TimeOfDay::from(time);
            changes.push(format!("Moved to {time}"));
            patch.time_of_day = Some(time);
        }
        if let Some(category) = self.category {
            changes.push(format!("Category set to {category}"));
            patch.category = Some(category);
        }
        if self.clear_product {
            changes.push("Product unlinked".to_string());
            patch.product_name = Some(None);
            patch.product_id = Some(None);
        }
        if let Some(product) = self.product {
            changes.push(format!("Product set to '{product}'"));
            patch.product_name = Some(Some(product));
        }
        if let Some(product_id) = self.product_id {
            changes.push(format!("Linked to product {product_id}"));
            patch.product_id = Some(Some(product_id));
        }
        if let Some(notes) = self.notes {
            changes.push("Updated notes".to_string());
            patch.notes = Some(Some(notes));
        }
        if let Some(schedule) = self.schedule.into_schedule(today) {
            changes.push(format!("Schedule set to {schedule}"));
            patch.schedule = Some(schedule);
        }

        (patch, changes)
    }
}

#[derive(ClapArgs)]
pub struct StepIdArgs {
    #[arg(help = "ID of the step")]
    pub id: u64,
}

/// Reorder steps. Listed steps take positions 0, 1, 2, ... in that order.
#[derive(ClapArgs)]
pub struct ReorderArgs {
    #[arg(required = true, num_args = 1.., help = "Step IDs in their new order")]
    pub ids: Vec<u64>,
}

#[derive(ClapArgs)]
pub struct TodayArgs {
    #[arg(short, long, value_enum, help = "Only the morning or evening routine")]
    pub time: Option<TimeOfDayArg>,
}

#[derive(ClapArgs)]
pub struct DoneArgs {
    #[arg(help = "ID of the step")]
    pub id: u64,
    #[arg(
        short,
        long,
        help = "Product actually used. Defaults to the step's product"
    )]
    pub product_used: Option<String>,
}

#[derive(ClapArgs)]
pub struct SkipArgs {
    #[arg(help = "ID of the step")]
    pub id: u64,
}

#[derive(ClapArgs)]
pub struct FinishArgs {
    #[arg(short, long, value_enum, help = "Only finish the morning or evening routine")]
    pub time: Option<TimeOfDayArg>,
}

#[derive(ClapArgs)]
pub struct UpcomingArgs {
    #[arg(short = 'n', long, default_value_t = 7, help = "Number of days to show")]
    pub days: u32,
}

#[derive(ClapArgs)]
pub struct AddProductArgs {
    #[arg(help = "Name of the product")]
    pub name: String,
}
