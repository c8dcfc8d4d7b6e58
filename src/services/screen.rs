//! Client-side model of a Schedule screen.
//!
//! One explicit state per screen instead of independent editing / modal /
//! saving flags, so two edits can never be open at once and a delete can
//! only be issued after it was confirmed.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        calendar::{CalendarDay, MonthRef, MonthSnapshot},
        schedule::ScheduleSlot,
    },
    services::{
        calendar::days_in_month,
        clock::Clock,
        refresh::{FetchGeneration, FetchTicket},
        schedule::{EditOutcome, ScheduleEditor, ScheduleError},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScreenVariant {
    /// Admin view: navigation and selection only.
    ReadOnly,
    /// Staff view: availability, capacity and slot edits.
    Editable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EditField {
    Availability,
    OrderLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PendingAction {
    SetAvailability { date: NaiveDate, available: bool },
    SetCapacity { date: NaiveDate, max_orders: i32 },
    AddSlot { date: NaiveDate, hour: u32 },
    DeleteSlot { schedule_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScreenState {
    Idle,
    Editing(EditField),
    AwaitingConfirmation(PendingAction),
    Saving(PendingAction),
}

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("this schedule view is read-only")]
    ReadOnly,
    #[error("cannot {event} while {state:?}")]
    InvalidTransition { state: ScreenState, event: &'static str },
    #[error("day {0} belongs to a neighbouring month")]
    FillerDay(u32),
    #[error("day {day} does not exist in {month}")]
    DayOutOfRange { day: u32, month: MonthRef },
    #[error("no day is selected")]
    NoSelection,
    #[error(transparent)]
    Edit(#[from] ScheduleError),
}

pub struct ScheduleScreen {
    variant: ScreenVariant,
    month: MonthRef,
    selected_day: Option<u32>,
    state: ScreenState,
    snapshot: Option<MonthSnapshot>,
    generation: FetchGeneration,
}

impl ScheduleScreen {
    pub fn new(variant: ScreenVariant, month: MonthRef, selected_day: Option<u32>) -> Self {
        Self {
            variant,
            month,
            selected_day,
            state: ScreenState::Idle,
            snapshot: None,
            generation: FetchGeneration::new(),
        }
    }

    /// Opens on the current month with today selected.
    pub fn for_today(variant: ScreenVariant, clock: &dyn Clock) -> Self {
        let today = clock.today();
        Self::new(variant, MonthRef::containing(today), Some(today.day()))
    }

    pub fn variant(&self) -> ScreenVariant {
        self.variant
    }

    pub fn month(&self) -> MonthRef {
        self.month
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&MonthSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_day.and_then(|d| self.month.day(d))
    }

    pub fn next_month(&mut self) -> Result<(), ScreenError> {
        self.navigate(self.month.next())
    }

    pub fn prev_month(&mut self) -> Result<(), ScreenError> {
        self.navigate(self.month.prev())
    }

    fn navigate(&mut self, month: MonthRef) -> Result<(), ScreenError> {
        if matches!(self.state, ScreenState::Saving(_)) {
            return Err(self.invalid("change month"));
        }
        self.month = month;
        self.selected_day = self.selected_day.filter(|d| *d <= days_in_month(month));
        self.snapshot = None;
        self.state = ScreenState::Idle;
        Ok(())
    }

    pub fn select_day(&mut self, day: u32) -> Result<(), ScreenError> {
        if day == 0 || day > days_in_month(self.month) {
            return Err(ScreenError::DayOutOfRange { day, month: self.month });
        }
        if matches!(self.state, ScreenState::Saving(_)) {
            return Err(self.invalid("select a day"));
        }
        self.selected_day = Some(day);
        self.state = ScreenState::Idle;
        Ok(())
    }

    /// Clicking a grid cell. Cells of the neighbouring months are inert.
    pub fn select_cell(&mut self, cell: &CalendarDay) -> Result<(), ScreenError> {
        if cell.is_filler() {
            return Err(ScreenError::FillerDay(cell.date));
        }
        self.select_day(cell.date)
    }

    pub fn begin_edit(&mut self, field: EditField) -> Result<(), ScreenError> {
        self.ensure_editable()?;
        match self.state {
            ScreenState::Idle => {
                self.state = ScreenState::Editing(field);
                Ok(())
            }
            _ => Err(self.invalid("start editing")),
        }
    }

    /// Moves an edit straight to saving. Deletes go through
    /// [`ScheduleScreen::request_delete`] instead.
    pub fn save(&mut self, action: PendingAction) -> Result<(), ScreenError> {
        self.ensure_editable()?;
        if matches!(action, PendingAction::DeleteSlot { .. }) {
            return Err(self.invalid("delete without confirmation"));
        }
        match self.state {
            ScreenState::Idle | ScreenState::Editing(_) => {
                self.state = ScreenState::Saving(action);
                Ok(())
            }
            _ => Err(self.invalid("save")),
        }
    }

    pub fn request_delete(&mut self, schedule_id: Uuid) -> Result<(), ScreenError> {
        self.ensure_editable()?;
        match self.state {
            ScreenState::Idle => {
                self.state =
                    ScreenState::AwaitingConfirmation(PendingAction::DeleteSlot { schedule_id });
                Ok(())
            }
            _ => Err(self.invalid("request delete")),
        }
    }

    pub fn confirm(&mut self) -> Result<(), ScreenError> {
        match std::mem::replace(&mut self.state, ScreenState::Idle) {
            ScreenState::AwaitingConfirmation(action) => {
                self.state = ScreenState::Saving(action);
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("confirm"))
            }
        }
    }

    pub fn cancel(&mut self) -> Result<(), ScreenError> {
        match self.state {
            ScreenState::Editing(_) | ScreenState::AwaitingConfirmation(_) => {
                self.state = ScreenState::Idle;
                Ok(())
            }
            ScreenState::Idle => Ok(()),
            ScreenState::Saving(_) => Err(self.invalid("cancel")),
        }
    }

    /// Runs the action held in `Saving` and returns to `Idle` whatever the
    /// outcome. Date-level actions are checked against the loaded month
    /// first, so a missing or duplicate slot never reaches the store. On
    /// success the reloaded month replaces the current snapshot.
    pub async fn commit(&mut self, editor: &ScheduleEditor) -> Result<EditOutcome, ScreenError> {
        let ScreenState::Saving(action) = self.state.clone() else {
            return Err(self.invalid("commit"));
        };

        let view = action_date(&action).and_then(|date| self.loaded_slots(date));
        let ticket = self.generation.begin();
        let result = match (action, view) {
            (PendingAction::SetAvailability { date, available }, Some(view)) => {
                editor.set_availability_in_view(&view, date, available).await
            }
            (PendingAction::SetAvailability { date, available }, None) => {
                editor.set_availability(date, available).await
            }
            (PendingAction::SetCapacity { date, max_orders }, Some(view)) => {
                editor.set_capacity_in_view(&view, date, max_orders).await
            }
            (PendingAction::SetCapacity { date, max_orders }, None) => {
                editor.set_capacity(date, max_orders).await
            }
            (PendingAction::AddSlot { date, hour }, Some(view)) => {
                editor.add_slot_in_view(&view, date, hour, None).await
            }
            (PendingAction::AddSlot { date, hour }, None) => editor.add_slot(date, hour, None).await,
            (PendingAction::DeleteSlot { schedule_id }, _) => {
                editor.delete_slot(schedule_id, true).await
            }
        };
        self.state = ScreenState::Idle;

        let outcome = result?;
        if outcome.month.month == self.month {
            self.generation
                .apply(ticket, Some(outcome.month.clone()), &mut self.snapshot);
        }
        Ok(outcome)
    }

    /// Slots of the loaded snapshot, when it covers `date`.
    fn loaded_slots(&self, date: NaiveDate) -> Option<Vec<ScheduleSlot>> {
        self.snapshot
            .as_ref()
            .filter(|snapshot| snapshot.month.contains(date))
            .map(|snapshot| snapshot.slots.clone())
    }

    /// Starts a month reload; pair with [`ScheduleScreen::finish_refresh`].
    /// Several reloads may be in flight, only the newest one is applied.
    pub fn begin_refresh(&self) -> (FetchTicket, MonthRef, Option<u32>) {
        (self.generation.begin(), self.month, self.selected_day)
    }

    pub fn finish_refresh(&mut self, ticket: FetchTicket, snapshot: MonthSnapshot) -> bool {
        if snapshot.month != self.month {
            return false;
        }
        self.generation.apply(ticket, Some(snapshot), &mut self.snapshot)
    }

    pub async fn refresh(&mut self, editor: &ScheduleEditor) -> bool {
        let (ticket, month, selected) = self.begin_refresh();
        let snapshot = editor.load_month(month, selected).await;
        self.finish_refresh(ticket, snapshot)
    }

    /// Builds a date-level action for the selected day.
    pub fn action_for_selected(
        &self,
        make: impl FnOnce(NaiveDate) -> PendingAction,
    ) -> Result<PendingAction, ScreenError> {
        self.selected_date().map(make).ok_or(ScreenError::NoSelection)
    }

    fn ensure_editable(&self) -> Result<(), ScreenError> {
        match self.variant {
            ScreenVariant::Editable => Ok(()),
            ScreenVariant::ReadOnly => Err(ScreenError::ReadOnly),
        }
    }

    fn invalid(&self, event: &'static str) -> ScreenError {
        ScreenError::InvalidTransition {
            state: self.state.clone(),
            event,
        }
    }
}

fn action_date(action: &PendingAction) -> Option<NaiveDate> {
    match action {
        PendingAction::SetAvailability { date, .. }
        | PendingAction::SetCapacity { date, .. }
        | PendingAction::AddSlot { date, .. } => Some(*date),
        PendingAction::DeleteSlot { .. } => None,
    }
}
