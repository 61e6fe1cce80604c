use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

const COMPETITION_MAPPING_FILE: &str = "competition_to_match_mapping.json";
const TEAM_MAPPING_FILE: &str = "match_to_team_mapping.json";

/// Competition and team-name lookups, loaded once at startup and read-only
/// afterwards. Missing or malformed mapping files degrade to empty maps with
/// a warning instead of failing startup.
#[derive(Debug, Clone, Default)]
pub struct CompetitionMap {
    competitions: Vec<(String, Vec<String>)>,
    team_names: HashMap<String, Vec<String>>,
}

impl CompetitionMap {
    pub fn load(data_dir: &Path) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let competitions = load_competition_mapping(
            &data_dir.join(COMPETITION_MAPPING_FILE),
            &mut warnings,
        );
        let team_names =
            load_team_mapping(&data_dir.join(TEAM_MAPPING_FILE), &mut warnings);
        (
            Self {
                competitions,
                team_names,
            },
            warnings,
        )
    }

    pub fn competitions(&self) -> &[(String, Vec<String>)] {
        &self.competitions
    }

    pub fn competition_ids(&self) -> impl Iterator<Item = &str> {
        self.competitions.iter().map(|(id, _)| id.as_str())
    }

    pub fn matches_for(&self, competition_id: &str) -> &[String] {
        self.competitions
            .iter()
            .find(|(id, _)| id == competition_id)
            .map(|(_, matches)| matches.as_slice())
            .unwrap_or(&[])
    }

    /// "Home vs Away" when the team mapping knows the match, otherwise the id.
    pub fn match_label(&self, match_id: &str) -> String {
        let key = format!("{match_id}.json");
        match self.team_names.get(&key) {
            Some(teams) if teams.len() >= 2 => format!("{} vs {}", teams[0], teams[1]),
            Some(teams) if teams.len() == 1 => teams[0].clone(),
            _ => match_id.to_string(),
        }
    }
}

fn load_competition_mapping(
    path: &Path,
    warnings: &mut Vec<String>,
) -> Vec<(String, Vec<String>)> {
    let Some(root) = read_json_object(path, warnings) else {
        return Vec::new();
    };

    let mut competitions: Vec<(String, Vec<String>)> = root
        .into_iter()
        .map(|(competition_id, matches)| {
            let ids = matches
                .as_array()
                .map(|list| list.iter().filter_map(id_string).collect())
                .unwrap_or_default();
            (competition_id, ids)
        })
        .collect();

    // Competition ids are numeric strings; sort numerically so the list is
    // stable across loads, falling back to lexicographic for odd keys.
    competitions.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        _ => a.cmp(b),
    });
    competitions
}

fn load_team_mapping(path: &Path, warnings: &mut Vec<String>) -> HashMap<String, Vec<String>> {
    let Some(root) = read_json_object(path, warnings) else {
        return HashMap::new();
    };

    root.into_iter()
        .map(|(file_name, teams)| {
            let names = teams
                .as_array()
                .map(|list| {
                    list.iter()
                        .filter_map(|team| team.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            (file_name, names)
        })
        .collect()
}

fn read_json_object(
    path: &Path,
    warnings: &mut Vec<String>,
) -> Option<serde_json::Map<String, Value>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => {
            warnings.push(format!("[WARN] Mapping file missing: {}", path.display()));
            return None;
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warnings.push(format!(
                "[WARN] Mapping file is not a JSON object: {}",
                path.display()
            ));
            None
        }
        Err(err) => {
            warnings.push(format!(
                "[WARN] Mapping file unreadable ({err}): {}",
                path.display()
            ));
            None
        }
    }
}

// Mapping files store match ids as numbers or as strings; accept both.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
