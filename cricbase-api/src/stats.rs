// Read-only aggregates served by the backend, displayed as-is

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub player_id: String,
    pub player_name: String,
    pub matches: u32,
    pub runs: u32,
    pub wickets: u32,
    pub average: f64,
    pub strike_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economy: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub team_id: String,
    pub team_name: String,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_percentage: f64,
}
