//! End-to-end tests for the incremental translation stage
//!
//! These drive whole utterances through `IncrementalTranslator` with the mock oracle
//! and replay every outbound message into a simulated downstream consumer, checking
//! that what downstream believes always matches the engine's latest translation.

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Downstream stage that applies outbound messages the way a consumer must
    #[derive(Default)]
    struct Consumer {
        live: Vec<OutputToken>,
        committed: Vec<String>,
    }

    impl Consumer {
        fn apply(&mut self, message: &UpdateMessage<OutputToken>) {
            for (token, update_type) in message.iter() {
                match update_type {
                    UpdateType::Add => self.live.push(token.clone()),
                    UpdateType::Revoke => {
                        let index = self
                            .live
                            .iter()
                            .position(|t| t.id == token.id)
                            .expect("revoke of a token downstream never saw");
                        self.live.remove(index);
                    }
                    UpdateType::Commit => {
                        let index = self
                            .live
                            .iter()
                            .position(|t| t.id == token.id)
                            .expect("commit of a token downstream never saw");
                        let token = self.live.remove(index);
                        self.committed.push(token.text);
                    }
                }
            }
        }

        fn text(&self) -> String {
            self.live
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        }
    }

    fn engine(translator: Arc<dyn MachineTranslator>, policy: FinalizationPolicy) -> IncrementalTranslator {
        IncrementalTranslator::new(LanguagePair::new("en", "de").unwrap(), policy, translator)
    }

    fn add(id: FragmentId, text: &str) -> UpdateMessage<Fragment> {
        UpdateMessage::from_unit(Fragment::new(id, text), UpdateType::Add)
    }

    fn revoke(id: FragmentId, text: &str) -> UpdateMessage<Fragment> {
        UpdateMessage::from_unit(Fragment::new(id, text), UpdateType::Revoke)
    }

    fn commit_all(fragments: &[(FragmentId, &str)]) -> UpdateMessage<Fragment> {
        fragments
            .iter()
            .map(|(id, text)| (Fragment::new(*id, *text), UpdateType::Commit))
            .collect()
    }

    fn feed(
        engine: &mut IncrementalTranslator,
        consumer: &mut Consumer,
        message: UpdateMessage<Fragment>,
    ) -> Option<UpdateMessage<OutputToken>> {
        let out = engine.process_update(message).expect("reconciliation failed");
        if let Some(out) = &out {
            consumer.apply(out);
        }
        out
    }

    // ============================================================================
    // Streaming ASR-like input with revisions
    // ============================================================================

    #[test]
    fn test_streaming_utterance_with_revision() {
        let mock = MockTranslator::from_pairs(
            "de",
            [
                ("the", "das"),
                ("the cat", "die Katze"),
                ("the cap", "die Mütze"),
                ("the cap is", "die Mütze ist"),
                ("the cap is red", "die Mütze ist rot"),
            ],
        );
        let mut engine = engine(Arc::new(mock.clone()), FinalizationPolicy::OperationBased);
        let mut consumer = Consumer::default();

        feed(&mut engine, &mut consumer, add(1, "the"));
        assert_eq!(consumer.text(), "das");

        feed(&mut engine, &mut consumer, add(2, "cat"));
        assert_eq!(consumer.text(), "die Katze");

        // ASR revises "cat" to "cap": only the last word changes downstream
        let mut revision = revoke(2, "cat");
        revision.add_unit(Fragment::new(3, "cap"), UpdateType::Add);
        let out = feed(&mut engine, &mut consumer, revision).unwrap();
        assert_eq!(out.texts_of(UpdateType::Revoke), vec!["Katze"]);
        assert_eq!(out.texts_of(UpdateType::Add), vec!["Mütze"]);

        feed(&mut engine, &mut consumer, add(4, "is"));
        let out = feed(&mut engine, &mut consumer, add(5, "red")).unwrap();
        assert_eq!(out.texts_of(UpdateType::Add), vec!["rot"]);
        assert!(out.units_of(UpdateType::Revoke).is_empty());
        assert_eq!(consumer.text(), engine.latest_translation());

        let out = feed(
            &mut engine,
            &mut consumer,
            commit_all(&[(1, "the"), (3, "cap"), (4, "is"), (5, "red")]),
        )
        .unwrap();
        assert_eq!(out.texts_of(UpdateType::Commit), vec!["die", "Mütze", "ist", "rot"]);
        assert_eq!(consumer.committed, vec!["die", "Mütze", "ist", "rot"]);
        assert!(consumer.live.is_empty());
        assert_eq!(mock.call_count(), 6);
    }

    #[test]
    fn test_consumer_always_matches_latest_translation() {
        let mut engine = engine(
            Arc::new(MockTranslator::new(MockMode::Reorder)),
            FinalizationPolicy::OperationBased,
        );
        let mut consumer = Consumer::default();

        let words = ["one", "two", "three", "four"];
        for (i, word) in words.iter().enumerate() {
            feed(&mut engine, &mut consumer, add(i as u64, word));
            assert_eq!(consumer.text(), engine.latest_translation());
        }
        feed(&mut engine, &mut consumer, revoke(3, "four"));
        assert_eq!(consumer.text(), "three two one");
        feed(&mut engine, &mut consumer, revoke(0, "one"));
        assert_eq!(consumer.text(), "three two");
    }

    // ============================================================================
    // Diff minimality through the engine
    // ============================================================================

    #[test]
    fn test_tail_revision_is_minimal() {
        let mock = MockTranslator::from_pairs("de", [("x", "A B C"), ("x y", "A B D")]);
        let mut engine = engine(Arc::new(mock), FinalizationPolicy::OperationBased);
        let mut consumer = Consumer::default();

        feed(&mut engine, &mut consumer, add(1, "x"));
        let out = feed(&mut engine, &mut consumer, add(2, "y")).unwrap();

        assert_eq!(out.texts_of(UpdateType::Revoke), vec!["C"]);
        assert_eq!(out.texts_of(UpdateType::Add), vec!["D"]);
        let live: Vec<&str> = engine.output_tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(live, vec!["A", "B", "D"]);
    }

    #[test]
    fn test_revoking_everything_revokes_all_tokens() {
        let mock = MockTranslator::from_pairs("de", [("x", "A B")]);
        let mut engine = engine(Arc::new(mock.clone()), FinalizationPolicy::OperationBased);
        let mut consumer = Consumer::default();

        feed(&mut engine, &mut consumer, add(1, "x"));
        let out = feed(&mut engine, &mut consumer, revoke(1, "x")).unwrap();

        assert_eq!(out.texts_of(UpdateType::Revoke), vec!["A", "B"]);
        assert!(out.units_of(UpdateType::Add).is_empty());
        assert!(consumer.live.is_empty());
        // blank source never reaches the oracle
        assert_eq!(mock.call_count(), 1);
    }

    // ============================================================================
    // Oracle call suppression
    // ============================================================================

    #[test]
    fn test_idempotent_noop_batches() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let mut engine = engine(Arc::new(mock.clone()), FinalizationPolicy::OperationBased);
        engine.process_update(add(1, "hello")).unwrap();

        for round in 0..5u64 {
            let id = 100 + round;
            let mut batch = add(id, "um");
            batch.add_unit(Fragment::new(id, "um"), UpdateType::Revoke);
            assert!(engine.process_update(batch).unwrap().is_none());
        }
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_oracle_called_once_per_changed_batch() {
        let mock = MockTranslator::new(MockMode::NoOp);
        let mut engine = engine(Arc::new(mock.clone()), FinalizationPolicy::OperationBased);

        let mut batch = UpdateMessage::new();
        for id in 0..10u64 {
            batch.add_unit(Fragment::new(id, "w"), UpdateType::Add);
        }
        engine.process_update(batch).unwrap();
        assert_eq!(mock.call_count(), 1);

        // each revoke changes the text: one call each
        for id in 0..3u64 {
            engine.process_update(revoke(id, "w")).unwrap();
        }
        assert_eq!(mock.call_count(), 4);

        // revokes of unknown fragments change nothing: no calls
        for id in 50..55u64 {
            engine.process_update(revoke(id, "w")).unwrap();
        }
        assert_eq!(mock.call_count(), 4);
        assert_eq!(engine.oracle_calls(), 4);
    }

    // ============================================================================
    // Finalization
    // ============================================================================

    #[test]
    fn test_finalization_clears_state_between_utterances() {
        let mut engine = engine(
            Arc::new(MockTranslator::new(MockMode::Suffix)),
            FinalizationPolicy::OperationBased,
        );
        let mut consumer = Consumer::default();

        feed(&mut engine, &mut consumer, add(1, "first"));
        feed(&mut engine, &mut consumer, commit_all(&[(1, "first")]));
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.current_text().is_empty());
        assert!(engine.latest_translation().is_empty());

        let out = feed(&mut engine, &mut consumer, add(2, "second")).unwrap();
        // nothing from the first utterance is revoked or re-emitted
        assert!(out.units_of(UpdateType::Revoke).is_empty());
        assert_eq!(out.texts_of(UpdateType::Add), vec!["second_de"]);
        assert_eq!(consumer.committed, vec!["first_de"]);
        assert_eq!(consumer.text(), "second_de");
    }

    #[test]
    fn test_commit_list_has_every_live_token_once() {
        let mock = MockTranslator::from_pairs("de", [("a", "X Y"), ("a b", "X Z W")]);
        let mut engine = engine(Arc::new(mock), FinalizationPolicy::OperationBased);
        let mut consumer = Consumer::default();

        feed(&mut engine, &mut consumer, add(1, "a"));
        let mut last = add(2, "b");
        last.add_unit(Fragment::new(2, "b"), UpdateType::Commit);
        let out = feed(&mut engine, &mut consumer, last).unwrap();

        let revoked: Vec<FragmentId> = out.units_of(UpdateType::Revoke).iter().map(|t| t.id).collect();
        let committed: Vec<&OutputToken> = out.units_of(UpdateType::Commit);
        assert_eq!(
            committed.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
            vec!["X", "Z", "W"]
        );
        assert!(committed.iter().all(|t| !revoked.contains(&t.id)));
        assert_eq!(consumer.committed, vec!["X", "Z", "W"]);
    }

    #[test]
    fn test_flag_policy_full_utterance() {
        let mock = MockTranslator::new(MockMode::NoOp);
        let mut engine = engine(Arc::new(mock.clone()), FinalizationPolicy::FlagBased);
        let mut consumer = Consumer::default();

        feed(&mut engine, &mut consumer, add(1, "bonjour"));
        let out = feed(
            &mut engine,
            &mut consumer,
            UpdateMessage::from_unit(Fragment::terminal(2, "monde"), UpdateType::Add),
        )
        .unwrap();

        assert_eq!(out.texts_of(UpdateType::Commit), vec!["bonjour", "monde"]);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(mock.call_count(), 2);
    }

    // ============================================================================
    // Failure recovery
    // ============================================================================

    /// Fails the first call, then behaves like `NoOp`
    struct FlakyTranslator {
        failed: AtomicBool,
    }

    impl MachineTranslator for FlakyTranslator {
        fn translate(&self, text: &str, _: &str, _: &str) -> MtResult<String> {
            if self.failed.swap(true, Ordering::SeqCst) {
                Ok(text.to_string())
            } else {
                Err(MtError::TranslationError("transient".to_string()))
            }
        }

        fn provider_name(&self) -> &str {
            "Flaky"
        }
    }

    #[test]
    fn test_pending_commit_survives_oracle_failure() {
        let flaky = Arc::new(FlakyTranslator {
            failed: AtomicBool::new(false),
        });
        let mut engine = engine(flaky, FinalizationPolicy::OperationBased);

        let mut batch = add(1, "ciao");
        batch.add_unit(Fragment::new(1, "ciao"), UpdateType::Commit);
        let err = engine.process_update(batch).unwrap_err();
        assert!(err.is_oracle_failure());
        assert!(engine.output_tokens().is_empty());

        // an empty follow-up batch retries and still finalizes
        let out = engine.process_update(UpdateMessage::new()).unwrap().unwrap();
        assert_eq!(out.texts_of(UpdateType::Add), vec!["ciao"]);
        assert_eq!(out.texts_of(UpdateType::Commit), vec!["ciao"]);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    // ============================================================================
    // Configuration
    // ============================================================================

    #[test]
    fn test_engine_from_json_config() {
        let config = load_config_from_str(
            r#"{"source_language": "de", "target_language": "en", "finalization": "flag"}"#,
        )
        .unwrap();
        let mut mappings = HashMap::new();
        mappings.insert(("hallo".to_string(), "en".to_string()), "hello".to_string());
        let mut engine = IncrementalTranslator::from_config(
            &config,
            Arc::new(MockTranslator::new(MockMode::Mappings(mappings))),
        )
        .unwrap();

        assert_eq!(engine.policy(), FinalizationPolicy::FlagBased);
        assert_eq!(engine.language_pair().model_name(), "Helsinki-NLP/opus-mt-de-en");

        let out = engine
            .process_update(UpdateMessage::from_unit(
                Fragment::terminal(1, "hallo"),
                UpdateType::Add,
            ))
            .unwrap()
            .unwrap();
        assert_eq!(out.texts_of(UpdateType::Add), vec!["hello"]);
        assert_eq!(out.texts_of(UpdateType::Commit), vec!["hello"]);
    }
}
