//! Command handlers for the `glow` binary.
//!
//! Each handler calls one facade operation, wraps the outcome in a core
//! display type and hands the markdown to the [`TerminalRenderer`].

use anyhow::{anyhow, Context, Result};
use glowlog_core::{
    display::{
        CreateResult, DeleteResult, FinishResult, Products, Steps, TodaySteps, ToggleResult,
        Upcoming, UpdateResult,
    },
    models::{CompletionRecord, RoutineStep, StepId, TimeOfDay},
    GlowError, Routine,
};
use jiff::civil::Date;
use log::debug;

use crate::{
    args::{
        AddProductArgs, AddStepArgs, Commands, DoneArgs, FinishArgs, ProductCommands, ReorderArgs,
        SkipArgs, StepCommands, StepIdArgs, TodayArgs, UpcomingArgs, UpdateStepArgs,
    },
    renderer::TerminalRenderer,
};

pub struct Cli {
    routine: Routine,
    renderer: TerminalRenderer,
    date: Date,
}

impl Cli {
    /// `date` is the day date-sensitive commands act on.
    pub fn new(routine: Routine, renderer: TerminalRenderer, date: Date) -> Self {
        Self {
            routine,
            renderer,
            date,
        }
    }

    /// Runs one command. Without a command, shows today's checklist.
    pub async fn run(&mut self, command: Option<Commands>) -> Result<()> {
        match command {
            Some(Commands::Step { command }) => self.handle_step_command(command).await,
            Some(Commands::Today(args)) => self.today(&args),
            Some(Commands::Done(args)) => self.done(args).await,
            Some(Commands::Skip(args)) => self.skip(&args).await,
            Some(Commands::Finish(args)) => self.finish(&args).await,
            Some(Commands::Progress) => self.progress(),
            Some(Commands::Upcoming(args)) => self.upcoming(&args),
            Some(Commands::Product { command }) => self.handle_product_command(command).await,
            None => self.today(&TodayArgs { time: None }),
        }
    }

    /// Writes any pending reorder and closes the routine.
    pub async fn shutdown(self) -> Result<()> {
        self.routine
            .shutdown()
            .await
            .context("Failed to save pending changes")
    }

    async fn handle_step_command(&mut self, command: StepCommands) -> Result<()> {
        match command {
            StepCommands::Add(args) => self.add_step(args).await,
            StepCommands::List => self.list_steps(),
            StepCommands::Show(args) => self.show_step(&args),
            StepCommands::Update(args) => self.update_step(args).await,
            StepCommands::Remove(args) => self.remove_step(&args).await,
            StepCommands::Reorder(args) => self.reorder_steps(&args).await,
        }
    }

    async fn handle_product_command(&mut self, command: ProductCommands) -> Result<()> {
        match command {
            ProductCommands::Add(args) => self.add_product(&args).await,
            ProductCommands::List => self.list_products().await,
        }
    }

    async fn add_step(&mut self, args: AddStepArgs) -> Result<()> {
        let step = self
            .routine
            .add_step(args.into_draft(self.date))
            .await
            .context("Failed to add step")?;

        self.renderer.render(&CreateResult::new(step).to_string())
    }

    fn list_steps(&self) -> Result<()> {
        let steps = Steps(self.routine.steps().to_vec());
        self.renderer.render(&steps.to_string())
    }

    fn show_step(&self, args: &StepIdArgs) -> Result<()> {
        let step = self.find_step(args.id)?;
        let next_due = match self.routine.next_due(args.id, self.date) {
            Some(day) => format!("Next due: {day}\n"),
            None => "Not due within the next year\n".to_string(),
        };
        self.renderer.render(&format!("{step}{next_due}"))
    }

    async fn update_step(&mut self, args: UpdateStepArgs) -> Result<()> {
        let id = args.id;
        self.find_step(id)?;

        let (patch, changes) = args.into_patch(self.date);
        if patch.is_empty() {
            return Err(anyhow!("Nothing to update; pass at least one field to change"));
        }

        let step = self
            .routine
            .update_step(id, patch)
            .await
            .with_context(|| format!("Failed to update step {id}"))?;

        self.renderer
            .render(&UpdateResult::with_changes(step, changes).to_string())
    }

    async fn remove_step(&mut self, args: &StepIdArgs) -> Result<()> {
        let step = self
            .routine
            .delete_step(args.id)
            .await
            .with_context(|| format!("Failed to remove step {}", args.id))?;

        self.renderer.render(&DeleteResult::new(step).to_string())
    }

    async fn reorder_steps(&mut self, args: &ReorderArgs) -> Result<()> {
        for &id in &args.ids {
            self.find_step(id)?;
        }

        let updates = self.routine.reorder_steps(&args.ids);
        debug!("Reordered {} steps", updates.len());
        self.routine
            .flush_pending_reorder()
            .await
            .context("Failed to save the new order")?;

        self.list_steps()
    }

    fn today(&self, args: &TodayArgs) -> Result<()> {
        let time_of_day = args.time.map(TimeOfDay::from);
        let today = TodaySteps {
            date: self.date,
            time_of_day,
            steps: self.routine.today_steps(time_of_day, self.date),
        };
        self.renderer.render(&today.to_string())
    }

    async fn done(&mut self, args: DoneArgs) -> Result<()> {
        let record = self
            .routine
            .toggle_step_completion(args.id, self.date, args.product_used)
            .await
            .with_context(|| format!("Failed to mark step {} done", args.id))?;

        self.render_toggle(args.id, record)
    }

    async fn skip(&mut self, args: &SkipArgs) -> Result<()> {
        let record = self
            .routine
            .toggle_step_skip(args.id, self.date)
            .await
            .with_context(|| format!("Failed to skip step {}", args.id))?;

        self.render_toggle(args.id, record)
    }

    fn render_toggle(&self, id: StepId, record: Option<CompletionRecord>) -> Result<()> {
        let result = ToggleResult {
            step: self.find_step(id)?,
            date: self.date,
            record,
        };
        self.renderer.render(&result.to_string())
    }

    async fn finish(&mut self, args: &FinishArgs) -> Result<()> {
        let time_of_day = args.time.map(TimeOfDay::from);
        let skipped = self
            .routine
            .finish_routine(time_of_day, self.date)
            .await
            .context("Failed to finish routine")?;

        let result = FinishResult {
            date: self.date,
            time_of_day,
            skipped,
        };
        self.renderer.render(&result.to_string())
    }

    fn progress(&self) -> Result<()> {
        let progress = self.routine.today_progress(self.date);
        self.renderer
            .render(&format!("Progress on {}: {progress}\n", self.date))
    }

    fn upcoming(&self, args: &UpcomingArgs) -> Result<()> {
        let days = self.routine.upcoming(self.date, args.days);
        self.renderer.render(&Upcoming(days).to_string())
    }

    async fn add_product(&self, args: &AddProductArgs) -> Result<()> {
        let product = self
            .routine
            .add_product(&args.name)
            .await
            .context("Failed to add product")?;

        self.renderer.render(&CreateResult::new(product).to_string())
    }

    async fn list_products(&self) -> Result<()> {
        let products = self
            .routine
            .products()
            .await
            .context("Failed to list products")?;

        self.renderer.render(&Products(products).to_string())
    }

    fn find_step(&self, id: StepId) -> Result<&RoutineStep> {
        self.routine
            .step(id)
            .ok_or_else(|| GlowError::StepNotFound { id }.into())
    }
}
