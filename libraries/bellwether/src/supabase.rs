//! Remote store backend over Supabase's PostgREST surface. Each collection is a
//! table of `(doc_id text primary key, doc jsonb)` rows, giving the schema-less
//! whole-document semantics the engine expects.

use crate::remote::{Collection, Document, OrderBy, RemoteError, RemoteStore};

#[derive(Clone, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct SupabaseConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

pub struct SupabaseClient {
    config: SupabaseConfig,
}

#[derive(serde::Deserialize)]
struct DocRow {
    doc: Document,
}

#[derive(serde::Serialize)]
struct UpsertRow<'a> {
    doc_id: &'a str,
    doc: &'a Document,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Self {
        Self { config }
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.supabase_url,
            collection.name()
        )
    }

    /// Upsert on the `doc_id` key; serves both create-or-overwrite and
    /// whole-document update.
    async fn upsert(
        &self,
        collection: Collection,
        doc_id: &str,
        doc: &Document,
    ) -> Result<(), RemoteError> {
        let client = fetch_happen::Client;
        let row = [UpsertRow { doc_id, doc }];
        let response = client
            .post(&self.collection_url(collection))
            .header("apikey", &self.config.supabase_anon_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.supabase_anon_key),
            )
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row)
            .map_err(|e| RemoteError::Unreachable(format!("{e:?}")))?
            .send()
            .await
            .map_err(|e| RemoteError::Unreachable(format!("{e:?}")))?;

        if !response.ok() {
            return Err(RemoteError::Status(response.status()));
        }
        Ok(())
    }
}

impl RemoteStore for SupabaseClient {
    async fn fetch_all(
        &self,
        collection: Collection,
        order: Option<OrderBy>,
    ) -> Result<Vec<Document>, RemoteError> {
        let client = fetch_happen::Client;
        let mut url = format!("{}?select=doc", self.collection_url(collection));
        if let Some(order) = order {
            let direction = if order.descending { "desc" } else { "asc" };
            url.push_str(&format!("&order=doc->>{}.{direction}", order.field));
        }

        let response = client
            .get(&url)
            .header("apikey", &self.config.supabase_anon_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.supabase_anon_key),
            )
            .send()
            .await
            .map_err(|e| RemoteError::Unreachable(format!("{e:?}")))?;

        if !response.ok() {
            return Err(RemoteError::Status(response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Unreachable(format!("{e:?}")))?;
        let rows: Vec<DocRow> =
            serde_json::from_str(&body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
        Ok(rows.into_iter().map(|row| row.doc).collect())
    }

    async fn put(
        &self,
        collection: Collection,
        doc_id: &str,
        doc: &Document,
    ) -> Result<(), RemoteError> {
        self.upsert(collection, doc_id, doc).await
    }

    async fn update(
        &self,
        collection: Collection,
        doc_id: &str,
        doc: &Document,
    ) -> Result<(), RemoteError> {
        // the system only ever sends complete documents, so an update is the
        // same upsert as a put
        self.upsert(collection, doc_id, doc).await
    }

    async fn delete(&self, collection: Collection, doc_id: &str) -> Result<(), RemoteError> {
        let client = fetch_happen::Client;
        let url = format!(
            "{}?doc_id=eq.{}",
            self.collection_url(collection),
            encode_key(doc_id)
        );
        let response = client
            .delete(&url)
            .header("apikey", &self.config.supabase_anon_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.supabase_anon_key),
            )
            .send()
            .await
            .map_err(|e| RemoteError::Unreachable(format!("{e:?}")))?;

        if !response.ok() {
            return Err(RemoteError::Status(response.status()));
        }
        Ok(())
    }
}

/// Generated record ids are base36, but option keys embed user-entered strand and
/// section names, which can carry spaces and the odd reserved character.
fn encode_key(doc_id: &str) -> String {
    let mut out = String::with_capacity(doc_id.len());
    for c in doc_id.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '&' => out.push_str("%26"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '%' => out.push_str("%25"),
            '+' => out.push_str("%2B"),
            _ => out.push(c),
        }
    }
    out
}
