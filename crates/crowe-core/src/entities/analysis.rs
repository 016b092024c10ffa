use std::future::Future;

use tracing::info;

use crate::entities::{Analysis, KvStore, NewAnalysis, keys, new_id};
use crate::error::Result;

/// Analyses returned by default from [`AnalysisStore::get_user_analyses`].
pub const DEFAULT_ANALYSIS_LIMIT: usize = 10;

pub trait AnalysisStore: Send + Sync + 'static {
    /// Stamp and record an analysis at the head of the user's history.
    fn save_analysis(&self, analysis: NewAnalysis) -> impl Future<Output = Result<Analysis>> + Send;

    /// Up to `limit` analyses, newest first.
    fn get_user_analyses(
        &self,
        user_id: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Analysis>>> + Send;
}

impl AnalysisStore for KvStore {
    async fn save_analysis(&self, analysis: NewAnalysis) -> Result<Analysis> {
        let saved = Analysis {
            id: new_id(),
            kind: analysis.kind,
            image_url: analysis.image_url,
            results: analysis.results,
            created_at: self.now(),
            user_id: analysis.user_id,
            farm_id: analysis.farm_id,
            strain_id: analysis.strain_id,
        };
        self.prepend(&keys::analyses(&saved.user_id), &saved).await?;
        info!(user_id = %saved.user_id, analysis_id = %saved.id, kind = %saved.kind, "analysis saved");
        Ok(saved)
    }

    async fn get_user_analyses(&self, user_id: &str, limit: usize) -> Result<Vec<Analysis>> {
        self.read_head(&keys::analyses(user_id), limit).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::clock::ManualClock;
    use crate::entities::AnalysisKind;
    use serde_json::json;
    use std::sync::Arc;

    fn analysis(user_id: &str, n: usize) -> NewAnalysis {
        NewAnalysis {
            user_id: user_id.into(),
            kind: AnalysisKind::Substrate,
            image_url: format!("https://img.example/{n}.jpg"),
            results: json!(format!("report {n}")),
            farm_id: None,
            strain_id: None,
        }
    }

    #[tokio::test]
    async fn newest_first_with_limit() {
        let store = KvStore::in_memory().with_clock(Arc::new(ManualClock::new(0, 1)));
        for n in 0..15 {
            store.save_analysis(analysis("u1", n)).await.unwrap();
        }
        let recent = store
            .get_user_analyses("u1", DEFAULT_ANALYSIS_LIMIT)
            .await
            .unwrap();
        assert_eq!(recent.len(), DEFAULT_ANALYSIS_LIMIT);
        assert_eq!(recent[0].results, json!("report 14"));
        assert_eq!(recent[9].results, json!("report 5"));
        assert!(recent.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }

    #[tokio::test]
    async fn history_is_not_capped() {
        let backend = MemoryBackend::new();
        let store = KvStore::new(Arc::new(backend.clone()));
        for n in 0..1_200 {
            store.save_analysis(analysis("u1", n)).await.unwrap();
        }
        assert_eq!(backend.list_len(&keys::analyses("u1")).await, 1_200);
    }

    #[tokio::test]
    async fn saved_record_is_returned_verbatim() {
        let store = KvStore::in_memory();
        let mut input = analysis("u1", 1);
        input.farm_id = Some("farm-1".into());
        input.results = json!({"health": "good", "score": 0.92});
        let saved = store.save_analysis(input).await.unwrap();
        let listed = store.get_user_analyses("u1", 1).await.unwrap();
        assert_eq!(listed, vec![saved]);
        assert!(store.get_user_analyses("u2", 10).await.unwrap().is_empty());
        assert!(store.get_user_analyses("u1", 0).await.unwrap().is_empty());
    }
}
