//! Fetch worker: owns the tokio runtime and the remote API client, services
//! commands from the UI queue and reports results as UI events.

use std::thread;

use client_core::ApiClient;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, api_url: String) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::Startup,
                    format!("fetch worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build fetch worker runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = ApiClient::new(api_url);
            let _ = ui_tx.try_send(UiEvent::Info("Fetch worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::LoadUsers => {
                        tracing::info!("backend: load_users");
                        match client.get_users().await {
                            Ok(users) => {
                                let _ = ui_tx.try_send(UiEvent::UsersLoaded(users));
                            }
                            Err(err) => {
                                tracing::error!("backend: load_users failed: {err}");
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::LoadUsers,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::LoadPostFeed {
                        user_id,
                        generation,
                    } => {
                        tracing::info!(user_id = user_id.0, generation, "backend: load_post_feed");
                        match client.fetch_post_feed(user_id).await {
                            Ok(posts) => {
                                let _ = ui_tx.try_send(UiEvent::PostsLoaded {
                                    generation,
                                    user_id,
                                    posts,
                                });
                            }
                            Err(err) => {
                                tracing::error!(
                                    user_id = user_id.0,
                                    "backend: load_post_feed failed: {err}"
                                );
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::LoadPosts,
                                    err.to_string(),
                                )));
                                // An empty feed still has to reach the UI so
                                // the selector re-enables and the placeholder
                                // renders.
                                let _ = ui_tx.try_send(UiEvent::PostsLoaded {
                                    generation,
                                    user_id,
                                    posts: Vec::new(),
                                });
                            }
                        }
                    }
                }
            }
        });
    });
}
