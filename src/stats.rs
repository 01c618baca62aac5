//! Per-chat usage counters and transcript preview.

use crate::api::{ChatMessage, ChatStats, GlobalStats, WhatsAppApiClient};
use crate::error::Result;
use crate::manage::normalize_jid;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsReport {
    pub stats: Vec<ChatStats>,
    pub global: GlobalStats,
}

impl StatsReport {
    pub fn summary(&self, today: NaiveDate) -> StatsSummary {
        StatsSummary::from_stats(&self.stats, today)
    }

    /// Chats ordered by most recent activity, unknown times last.
    pub fn by_recent_activity(&self) -> Vec<&ChatStats> {
        let mut chats: Vec<&ChatStats> = self.stats.iter().collect();
        chats.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        chats
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSummary {
    pub total_users: usize,
    pub total_messages: u64,
    pub active_today: usize,
}

impl StatsSummary {
    /// `today` is a UTC calendar date.
    pub fn from_stats(stats: &[ChatStats], today: NaiveDate) -> Self {
        Self {
            total_users: stats.len(),
            total_messages: stats.iter().map(|s| s.msg_count).sum(),
            active_today: stats
                .iter()
                .filter(|s| s.last_active.map(|at| at.date_naive()) == Some(today))
                .count(),
        }
    }
}

pub struct StatsBoard {
    client: Arc<WhatsAppApiClient>,
}

impl StatsBoard {
    pub fn new(client: Arc<WhatsAppApiClient>) -> Self {
        Self { client }
    }

    pub async fn fetch(&self) -> Result<StatsReport> {
        let resp = self.client.stats().await?;
        debug!(chats = resp.stats.len(), requests = resp.global.requests, "Stats fetched");
        Ok(StatsReport {
            stats: resp.stats,
            global: resp.global,
        })
    }

    /// Bare phone numbers are normalized; full jids (including groups) pass through.
    pub async fn history(&self, chat: &str) -> Result<Vec<ChatMessage>> {
        let jid = if chat.contains('@') {
            chat.trim().to_string()
        } else {
            normalize_jid(chat)?
        };
        self.client.chat_history(&jid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat(jid: &str, count: u64, last_active: Option<(u32, u32)>) -> ChatStats {
        ChatStats {
            jid: jid.to_string(),
            push_name: String::new(),
            msg_count: count,
            last_active: last_active.map(|(day, hour)| Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()),
        }
    }

    fn board_for(server: &MockServer) -> StatsBoard {
        let config = DashboardConfig::new(server.uri(), "wa-bot-ai");
        StatsBoard::new(Arc::new(WhatsAppApiClient::new(&config).unwrap()))
    }

    #[test]
    fn test_summary_counts() {
        let stats = vec![
            chat("a@s.whatsapp.net", 10, Some((1, 8))),
            chat("b@s.whatsapp.net", 5, Some((1, 23))),
            chat("c@s.whatsapp.net", 7, Some((2, 0))),
            chat("d@s.whatsapp.net", 0, None),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let summary = StatsSummary::from_stats(&stats, today);
        assert_eq!(
            summary,
            StatsSummary {
                total_users: 4,
                total_messages: 22,
                active_today: 2,
            }
        );
    }

    #[test]
    fn test_summary_of_nothing() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(StatsSummary::from_stats(&[], today), StatsSummary::default());
    }

    #[test]
    fn test_recent_activity_order() {
        let report = StatsReport {
            stats: vec![
                chat("old", 1, Some((1, 1))),
                chat("never", 1, None),
                chat("new", 1, Some((3, 1))),
            ],
            global: GlobalStats::default(),
        };
        let order: Vec<&str> = report.by_recent_activity().iter().map(|c| c.jid.as_str()).collect();
        assert_eq!(order, vec!["new", "old", "never"]);
    }

    #[tokio::test]
    async fn test_fetch_report() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/whatsapp/stats/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "stats": [
                    { "jid": "6281234567890@s.whatsapp.net", "push_name": "Budi", "msg_count": 12, "last_active": 1772353800000u64 }
                ],
                "global": { "requests": 40, "responses": 38 }
            })))
            .mount(&mock_server)
            .await;

        let report = board_for(&mock_server).fetch().await.unwrap();
        assert_eq!(report.stats.len(), 1);
        assert_eq!(report.global.responses, 38);
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(report.summary(today).active_today, 1);
    }

    #[tokio::test]
    async fn test_history_normalizes_bare_number() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/whatsapp/history/6281234567890@s.whatsapp.net"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "history": [
                    { "role": "user", "content": "halo" },
                    { "role": "model", "content": "Halo juga!", "latency": 820 }
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let history = board_for(&mock_server).history("0812 3456 7890").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].latency, Some(820));
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let err = board_for(&mock_server).fetch().await.unwrap_err();
        assert!(err.is_transport());
    }
}
