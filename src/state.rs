use std::collections::VecDeque;

use crate::competitions::CompetitionMap;
use crate::match_stats::{GoalRow, StatRow};
use crate::timeline::MatchSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Competitions,
    Matches,
    Chart,
}

/// Everything one successful analysis request produced; replaced wholesale on
/// the next request, never persisted.
#[derive(Debug, Clone)]
pub struct MatchAnalysis {
    pub match_id: String,
    pub series: MatchSeries,
    pub stats: Vec<StatRow>,
    pub goals: Vec<GoalRow>,
}

pub struct AppState {
    pub screen: Screen,
    pub competitions: CompetitionMap,
    pub selected_competition: usize,
    pub selected_match: usize,
    pub analysis: Option<MatchAnalysis>,
    pub analysis_error: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(competitions: CompetitionMap) -> Self {
        Self {
            screen: Screen::Competitions,
            competitions,
            selected_competition: 0,
            selected_match: 0,
            analysis: None,
            analysis_error: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn selected_competition_id(&self) -> Option<String> {
        self.competitions
            .competitions()
            .get(self.selected_competition)
            .map(|(id, _)| id.clone())
    }

    pub fn current_match_ids(&self) -> &[String] {
        self.competitions
            .competitions()
            .get(self.selected_competition)
            .map(|(_, matches)| matches.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_match_id(&self) -> Option<String> {
        self.current_match_ids().get(self.selected_match).cloned()
    }

    pub fn select_next(&mut self) {
        let total = self.selection_len();
        if total == 0 {
            return;
        }
        let selected = self.selection_mut();
        if *selected + 1 < total {
            *selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selection_len() == 0 {
            return;
        }
        let selected = self.selection_mut();
        *selected = selected.saturating_sub(1);
    }

    fn selection_len(&self) -> usize {
        match self.screen {
            Screen::Competitions => self.competitions.competitions().len(),
            Screen::Matches => self.current_match_ids().len(),
            Screen::Chart => 0,
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.screen {
            Screen::Competitions => &mut self.selected_competition,
            // Chart keeps the match selection it was opened from.
            Screen::Matches | Screen::Chart => &mut self.selected_match,
        }
    }

    pub fn enter_matches(&mut self) {
        if self.selected_competition_id().is_some() {
            self.selected_match = 0;
            self.screen = Screen::Matches;
        }
    }

    pub fn back(&mut self) {
        self.screen = match self.screen {
            Screen::Chart => Screen::Matches,
            Screen::Matches | Screen::Competitions => Screen::Competitions,
        };
    }
}
