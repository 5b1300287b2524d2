//! The translator: picks a language, loads its dictionaries and rewrites a document.
//!
//! An apply runs in two phases. [`Translator::prepare`] retrieves the
//! requested dictionary and, for non-default languages, the default
//! dictionary as fallback; both retrievals run concurrently and failures
//! degrade to empty dictionaries. [`Translator::commit`] then rewrites the
//! document and saves the preference, unless a later `prepare` has superseded
//! it in the meantime. [`Translator::apply`] runs both phases back to back.

use crate::config::Config;
use crate::document::{strip_markup, Document, ElementRole};
use crate::i18n::{
    lookup_with_fallback, primary_subtag, Dictionary, DictionarySource, FetchError, FileSource,
    HttpSource, LanguageCode, LanguageRegistry,
};
use crate::preference::{FileStore, PreferenceStore};
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Identifies one `prepare` call; only the most recent ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyTicket(u64);

/// Dictionaries retrieved for a language, ready to be committed to a document.
#[derive(Debug, Clone)]
pub struct PreparedTranslation {
    pub language: LanguageCode,
    pub primary: Dictionary,
    /// Absent when the language is the default one
    pub fallback: Option<Dictionary>,
    pub ticket: ApplyTicket,
}

/// What an apply did to the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub language: Option<LanguageCode>,
    /// Number of elements whose content was replaced
    pub translated: usize,
    /// Keys resolved from the fallback dictionary
    pub fallback_keys: Vec<String>,
    /// Keys found in neither dictionary; those elements were left untouched
    pub missing_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied(ApplyReport),
    /// A later apply was started; document and preference were left alone
    Superseded { language: LanguageCode },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied(_))
    }

    pub fn report(&self) -> Option<&ApplyReport> {
        match self {
            ApplyOutcome::Applied(report) => Some(report),
            ApplyOutcome::Superseded { .. } => None,
        }
    }
}

/// Applies translations to documents.
///
/// Cloning is cheap; clones share the dictionary source, the preference store
/// and the supersession counter.
#[derive(Clone)]
pub struct Translator {
    registry: LanguageRegistry,
    source: Arc<dyn DictionarySource>,
    store: Arc<dyn PreferenceStore>,
    preference_key: String,
    fetch_timeout: Option<Duration>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("registry", &self.registry)
            .field("preference_key", &self.preference_key)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl Translator {
    /// Create a translator with explicit seams.
    pub fn new(
        registry: LanguageRegistry,
        source: Arc<dyn DictionarySource>,
        store: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            registry,
            source,
            store,
            preference_key: "lang".to_string(),
            fetch_timeout: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a translator from configuration.
    ///
    /// Dictionaries come over HTTP when `base_url` is set and from
    /// `locale_dir` otherwise; the preference lives in `preference_file`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source: Arc<dyn DictionarySource> = match &config.base_url {
            Some(base_url) => Arc::new(HttpSource::new(base_url)?),
            None => Arc::new(FileSource::new(&config.locale_dir)),
        };
        let store = Arc::new(FileStore::new(&config.preference_file));

        Ok(Self::new(config.registry.clone(), source, store)
            .with_preference_key(&config.preference_key)
            .with_fetch_timeout(config.fetch_timeout))
    }

    /// Set the key the language is saved under.
    pub fn with_preference_key(mut self, key: &str) -> Self {
        self.preference_key = key.to_string();
        self
    }

    /// Bound each dictionary retrieval; `None` waits indefinitely.
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Determine the language to start with.
    ///
    /// Uses the saved preference when it is a recognized language, else the
    /// host locale hint when its primary subtag names a recognized
    /// non-default language, else the default language.
    pub fn resolve_initial_language(&self, env_hint: Option<&str>) -> LanguageCode {
        let saved = match self.store.get(&self.preference_key) {
            Ok(saved) => saved,
            Err(e) => {
                warn!("i18n: could not read saved language: {}", e);
                None
            }
        };

        if let Some(lang) = saved.as_deref().and_then(|code| self.registry.recognize(code)) {
            debug!("i18n: using saved language {}", lang);
            return lang;
        }
        if let Some(code) = saved {
            debug!("i18n: ignoring unrecognized saved language '{}'", code);
        }

        if let Some(lang) = env_hint
            .and_then(primary_subtag)
            .and_then(|code| self.registry.recognize(&code))
            .filter(|lang| !self.registry.is_default(lang))
        {
            debug!("i18n: using language {} from locale hint", lang);
            return lang;
        }

        self.registry.default_language().clone()
    }

    /// Retrieve and parse the dictionary for `lang`.
    ///
    /// Never fails: any retrieval or parse problem is logged and an empty
    /// dictionary is returned instead.
    pub async fn fetch_dictionary(&self, lang: &LanguageCode) -> Dictionary {
        match self.try_fetch_dictionary(lang).await {
            Ok(dictionary) => dictionary,
            Err(e) => {
                warn!("i18n: failed to load {}: {}", lang, e);
                Dictionary::empty(lang.clone())
            }
        }
    }

    async fn try_fetch_dictionary(&self, lang: &LanguageCode) -> Result<Dictionary, FetchError> {
        let locator = self
            .registry
            .locator(lang)
            .ok_or_else(|| FetchError::UnknownLanguage(lang.clone()))?;
        debug!("i18n: fetching locale {} from {}", lang, locator);

        let retrieval = self.source.retrieve(locator);
        let content = match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, retrieval)
                .await
                .map_err(|_| FetchError::Timeout(limit))??,
            None => retrieval.await?,
        };

        let parsed = Dictionary::parse(lang.clone(), &content)?;
        for (key, kind) in &parsed.report.rejected {
            warn!("i18n: {} entry '{}' is a {}, not a string; skipped", lang, key, kind);
        }

        Ok(parsed.dictionary)
    }

    /// Retrieve the dictionaries for `lang` and take a ticket.
    ///
    /// Taking the ticket supersedes every earlier, not yet committed, prepare.
    pub async fn prepare(&self, lang: &LanguageCode) -> PreparedTranslation {
        let ticket = ApplyTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        let default = self.registry.default_language();
        let needs_fallback = lang != default;

        let (primary, fallback) = futures::join!(self.fetch_dictionary(lang), async {
            if needs_fallback {
                Some(self.fetch_dictionary(default).await)
            } else {
                None
            }
        });

        PreparedTranslation {
            language: lang.clone(),
            primary,
            fallback,
            ticket,
        }
    }

    /// Check whether `ticket` is still the most recent one.
    pub fn is_current(&self, ticket: ApplyTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Invalidate every outstanding prepared translation.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Rewrite `document` with prepared dictionaries and save the language.
    ///
    /// The language attribute is set first, then every tagged element is
    /// resolved (primary, then fallback). Title elements receive plain text.
    /// Elements with no usable value keep their content. The preference is
    /// written only after the rewrite.
    pub fn commit<D>(&self, prepared: PreparedTranslation, document: &mut D) -> ApplyOutcome
    where
        D: Document + ?Sized,
    {
        let PreparedTranslation {
            language,
            primary,
            fallback,
            ticket,
        } = prepared;

        if !self.is_current(ticket) {
            info!("i18n: apply of {} superseded by a later request", language);
            return ApplyOutcome::Superseded { language };
        }

        document.set_language(&language);
        debug!(
            "i18n: applying language {} ({} keys, {} fallback keys)",
            language,
            primary.len(),
            fallback.as_ref().map_or(0, Dictionary::len)
        );

        let mut report = ApplyReport {
            language: Some(language.clone()),
            ..ApplyReport::default()
        };

        for node in document.translatable_nodes() {
            let key = node.key().to_string();
            let Some(resolution) = lookup_with_fallback(&key, &primary, fallback.as_ref()) else {
                warn!("i18n: missing key {}", key);
                report.missing_keys.push(key);
                continue;
            };

            match node.role() {
                ElementRole::Title => node.set_content(&strip_markup(resolution.value)),
                ElementRole::Content => node.set_content(resolution.value),
            }

            report.translated += 1;
            if resolution.from_fallback {
                report.fallback_keys.push(key);
            }
        }

        if let Err(e) = self.store.set(&self.preference_key, language.as_str()) {
            warn!("i18n: could not save language {}: {}", language, e);
        }

        ApplyOutcome::Applied(report)
    }

    /// Prepare and commit in one step.
    pub async fn apply<D>(&self, lang: &LanguageCode, document: &mut D) -> ApplyOutcome
    where
        D: Document + ?Sized,
    {
        let prepared = self.prepare(lang).await;
        self.commit(prepared, document)
    }
}
