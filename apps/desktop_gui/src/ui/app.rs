use clap::Parser;
use client_core::PostDetail;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{Comment, PostId, User, UserId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

const SHOW_COMMENTS_LABEL: &str = "Show Comments";
const HIDE_COMMENTS_LABEL: &str = "Hide Comments";
const EMPTY_FEED_PLACEHOLDER: &str = "Select an Employee to display their posts.";
const SELECTOR_PROMPT: &str = "Select an Employee";
/// Selection applied when the dropdown has no chosen entry yet.
const DEFAULT_USER_ID: UserId = UserId(1);

#[derive(Debug, Clone, Parser)]
#[command(name = "desktop_gui", about = "Browse employee posts and comments")]
pub struct StartupConfig {
    /// Base URL of the remote posts API.
    #[arg(long, default_value = "https://jsonplaceholder.typicode.com")]
    pub api_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

/// One dropdown entry: value is the employee's id, label their display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeOption {
    pub value: UserId,
    pub label: String,
}

pub fn employee_options(users: &[User]) -> Vec<EmployeeOption> {
    users
        .iter()
        .map(|user| EmployeeOption {
            value: user.id,
            label: user.name.clone(),
        })
        .collect()
}

/// A rendered post plus its comment thread's shown/hidden flag.
///
/// The toggle button's label derives from the same flag, so label and
/// visibility can never drift apart.
#[derive(Debug, Clone)]
pub struct PostArticle {
    pub detail: PostDetail,
    pub comments_visible: bool,
}

impl PostArticle {
    fn new(detail: PostDetail) -> Self {
        Self {
            detail,
            comments_visible: false,
        }
    }

    pub fn post_id(&self) -> PostId {
        self.detail.post.id
    }

    pub fn id_line(&self) -> String {
        format!("Post ID: {}", self.detail.post.id.0)
    }

    pub fn author_line(&self) -> String {
        match &self.detail.author {
            Some(author) => format!("Author: {} with {}", author.name, author.company.name),
            None => "Author unavailable".to_string(),
        }
    }

    pub fn catch_phrase(&self) -> Option<&str> {
        self.detail
            .author
            .as_ref()
            .map(|author| author.company.catch_phrase.as_str())
    }

    pub fn toggle_button_label(&self) -> &'static str {
        if self.comments_visible {
            HIDE_COMMENTS_LABEL
        } else {
            SHOW_COMMENTS_LABEL
        }
    }
}

pub fn comment_footer(comment: &Comment) -> String {
    format!("From: {}", comment.email)
}

pub struct EmployeeBrowserApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    users: Vec<User>,
    users_loaded: bool,
    selected_user: Option<UserId>,
    articles: Vec<PostArticle>,
    /// Monotonic refresh counter; results tagged with an older value are
    /// stale and dropped.
    refresh_generation: u64,
    posts_loading: bool,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl EmployeeBrowserApp {
    pub fn bootstrap(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            users: Vec::new(),
            users_loaded: false,
            selected_user: None,
            articles: Vec::new(),
            refresh_generation: 0,
            posts_loading: false,
            status: "Loading employees...".to_string(),
            status_banner: None,
        };
        dispatch_backend_command(&app.cmd_tx, BackendCommand::LoadUsers, &mut app.status);
        app
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::UsersLoaded(users) => {
                    self.status = format!("Loaded {} employees", users.len());
                    self.users = users;
                    self.users_loaded = true;
                }
                UiEvent::PostsLoaded {
                    generation,
                    user_id,
                    posts,
                } => {
                    if generation != self.refresh_generation {
                        tracing::debug!(
                            generation,
                            current = self.refresh_generation,
                            "dropping stale post feed"
                        );
                        continue;
                    }
                    self.articles = posts.into_iter().map(PostArticle::new).collect();
                    self.posts_loading = false;
                    self.status = format!(
                        "Showing {} posts for employee {}",
                        self.articles.len(),
                        user_id.0
                    );
                }
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "ui error: {}", err.message());
                    self.status = format!("{} error: {}", err_label(err.category()), err.message());
                    self.status_banner = Some(StatusBanner {
                        severity: StatusBannerSeverity::Error,
                        message: self.status.clone(),
                    });
                }
            }
        }
    }

    /// The employee whose posts a refresh should fetch; defaults to the
    /// first employee when the dropdown has no selection.
    pub fn effective_selection(&self) -> UserId {
        self.selected_user.unwrap_or(DEFAULT_USER_ID)
    }

    fn selector_enabled(&self) -> bool {
        self.users_loaded && !self.posts_loading
    }

    pub fn select_employee(&mut self, user_id: Option<UserId>) {
        self.selected_user = user_id;
        let user_id = self.effective_selection();
        self.request_post_feed(user_id);
    }

    fn request_post_feed(&mut self, user_id: UserId) {
        let generation = self.refresh_generation + 1;
        self.status = format!("Loading posts for employee {}...", user_id.0);
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::LoadPostFeed { user_id, generation },
            &mut self.status,
        );
        // Only commit the refresh once the worker will actually service it;
        // otherwise the selector would stay disabled forever.
        if queued {
            self.refresh_generation = generation;
            self.posts_loading = true;
        }
    }

    /// Flips the comment thread for `post_id` between shown and hidden.
    /// Returns the new visibility, or `None` when no article matches.
    pub fn toggle_comments(&mut self, post_id: PostId) -> Option<bool> {
        let article = self
            .articles
            .iter_mut()
            .find(|article| article.post_id() == post_id)?;
        article.comments_visible = !article.comments_visible;
        Some(article.comments_visible)
    }

    fn show_selector(&mut self, ui: &mut egui::Ui) {
        let options = employee_options(&self.users);
        let selected_label = self
            .selected_user
            .and_then(|id| self.users.iter().find(|user| user.id == id))
            .map(|user| user.name.clone())
            .unwrap_or_else(|| SELECTOR_PROMPT.to_string());

        let mut choice = self.selected_user;
        ui.horizontal(|ui| {
            ui.label("Employee:");
            ui.add_enabled_ui(self.selector_enabled(), |ui| {
                egui::ComboBox::from_id_salt("employee_select")
                    .selected_text(selected_label)
                    .show_ui(ui, |ui| {
                        for option in &options {
                            ui.selectable_value(
                                &mut choice,
                                Some(option.value),
                                option.label.clone(),
                            );
                        }
                    });
            });
            if self.posts_loading {
                ui.spinner();
            }
        });

        if choice != self.selected_user {
            self.select_employee(choice);
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn show_post_feed(&mut self, ui: &mut egui::Ui) {
        if self.articles.is_empty() {
            ui.add_space(12.0);
            ui.label(egui::RichText::new(EMPTY_FEED_PLACEHOLDER).italics());
            return;
        }

        let mut toggle_request = None;
        for article in &self.articles {
            ui.group(|ui| {
                ui.heading(&article.detail.post.title);
                ui.label(&article.detail.post.body);
                ui.label(article.id_line());
                ui.label(article.author_line());
                if let Some(catch_phrase) = article.catch_phrase() {
                    ui.label(egui::RichText::new(catch_phrase).italics());
                }
                if ui.button(article.toggle_button_label()).clicked() {
                    toggle_request = Some(article.post_id());
                }
                if article.comments_visible {
                    ui.separator();
                    for comment in &article.detail.comments {
                        ui.label(egui::RichText::new(&comment.name).strong());
                        ui.label(&comment.body);
                        ui.small(comment_footer(comment));
                        ui.add_space(4.0);
                    }
                }
            });
            ui.add_space(6.0);
        }

        if let Some(post_id) = toggle_request {
            self.toggle_comments(post_id);
        }
    }
}

impl eframe::App for EmployeeBrowserApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("selector_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            self.show_selector(ui);
            ui.add_space(6.0);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.small(egui::RichText::new(&self.status).weak());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.show_post_feed(ui);
            });
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::PostDetail;
    use crossbeam_channel::bounded;
    use shared::domain::{Comment, CommentId, Company, Post, PostId, User, UserId};

    fn test_app() -> (
        EmployeeBrowserApp,
        Receiver<BackendCommand>,
        Sender<UiEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
        let (ui_tx, ui_rx) = bounded::<UiEvent>(16);
        let app = EmployeeBrowserApp::bootstrap(cmd_tx, ui_rx);
        (app, cmd_rx, ui_tx)
    }

    fn user(id: i64, name: &str) -> User {
        User {
            id: UserId(id),
            name: name.to_string(),
            company: Company {
                name: format!("{name} Co"),
                catch_phrase: format!("{name} catchphrase"),
            },
        }
    }

    fn detail(post_id: i64, user_id: i64, title: &str) -> PostDetail {
        PostDetail {
            post: Post {
                id: PostId(post_id),
                user_id: UserId(user_id),
                title: title.to_string(),
                body: format!("{title} body"),
            },
            author: Some(user(user_id, "Alice")),
            comments: vec![Comment {
                id: CommentId(post_id * 10),
                post_id: PostId(post_id),
                name: "a commenter".to_string(),
                email: "commenter@example.com".to_string(),
                body: "nice post".to_string(),
            }],
        }
    }

    #[test]
    fn employee_options_map_users_in_input_order() {
        let users = vec![user(3, "Carol"), user(1, "Alice"), user(2, "Bob")];
        let options = employee_options(&users);

        assert_eq!(options.len(), 3);
        assert_eq!(options[0].value, UserId(3));
        assert_eq!(options[0].label, "Carol");
        assert_eq!(options[2].label, "Bob");
    }

    #[test]
    fn bootstrap_queues_a_users_load() {
        let (_app, cmd_rx, _ui_tx) = test_app();
        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::LoadUsers)));
    }

    #[test]
    fn selecting_an_employee_disables_selector_and_queues_feed_load() {
        let (mut app, cmd_rx, _ui_tx) = test_app();
        let _ = cmd_rx.try_recv();

        app.users = vec![user(2, "Bob")];
        app.users_loaded = true;
        app.select_employee(Some(UserId(2)));

        assert!(app.posts_loading);
        assert!(!app.selector_enabled());
        match cmd_rx.try_recv() {
            Ok(BackendCommand::LoadPostFeed {
                user_id,
                generation,
            }) => {
                assert_eq!(user_id, UserId(2));
                assert_eq!(generation, 1);
            }
            other => panic!("expected LoadPostFeed, got {other:?}"),
        }
    }

    #[test]
    fn empty_selection_falls_back_to_first_employee() {
        let (mut app, cmd_rx, _ui_tx) = test_app();
        let _ = cmd_rx.try_recv();

        app.select_employee(None);

        match cmd_rx.try_recv() {
            Ok(BackendCommand::LoadPostFeed { user_id, .. }) => {
                assert_eq!(user_id, DEFAULT_USER_ID);
            }
            other => panic!("expected LoadPostFeed, got {other:?}"),
        }
    }

    #[test]
    fn failed_dispatch_rolls_back_loading_state() {
        let (mut app, cmd_rx, _ui_tx) = test_app();
        let _ = cmd_rx.try_recv();
        drop(cmd_rx);

        app.users_loaded = true;
        app.select_employee(Some(UserId(2)));

        assert!(!app.posts_loading);
        assert!(app.selector_enabled());
        assert_eq!(app.refresh_generation, 0);
        assert!(app.status.contains("disconnected"));
    }

    #[test]
    fn posts_loaded_replaces_feed_wholesale() {
        let (mut app, _cmd_rx, ui_tx) = test_app();
        app.request_post_feed(UserId(1));
        ui_tx
            .try_send(UiEvent::PostsLoaded {
                generation: app.refresh_generation,
                user_id: UserId(1),
                posts: vec![detail(10, 1, "first"), detail(11, 1, "second")],
            })
            .expect("send posts");
        app.process_ui_events();
        assert_eq!(app.articles.len(), 2);

        // A later refresh replaces everything, including toggle state.
        app.toggle_comments(PostId(10));
        app.request_post_feed(UserId(1));
        ui_tx
            .try_send(UiEvent::PostsLoaded {
                generation: app.refresh_generation,
                user_id: UserId(1),
                posts: vec![detail(12, 1, "third")],
            })
            .expect("send refreshed posts");
        app.process_ui_events();

        assert_eq!(app.articles.len(), 1);
        assert_eq!(app.articles[0].post_id(), PostId(12));
        assert!(!app.articles[0].comments_visible);
        assert!(!app.posts_loading);
    }

    #[test]
    fn stale_post_feed_results_are_discarded() {
        let (mut app, _cmd_rx, ui_tx) = test_app();
        app.request_post_feed(UserId(1));
        let stale_generation = app.refresh_generation;
        app.request_post_feed(UserId(2));

        ui_tx
            .try_send(UiEvent::PostsLoaded {
                generation: stale_generation,
                user_id: UserId(1),
                posts: vec![detail(10, 1, "stale")],
            })
            .expect("send stale posts");
        app.process_ui_events();

        assert!(app.articles.is_empty());
        assert!(app.posts_loading);

        ui_tx
            .try_send(UiEvent::PostsLoaded {
                generation: app.refresh_generation,
                user_id: UserId(2),
                posts: vec![detail(20, 2, "current")],
            })
            .expect("send current posts");
        app.process_ui_events();

        assert_eq!(app.articles.len(), 1);
        assert_eq!(app.articles[0].post_id(), PostId(20));
        assert!(!app.posts_loading);
    }

    #[test]
    fn toggling_comments_twice_restores_original_state() {
        let (mut app, _cmd_rx, _ui_tx) = test_app();
        app.articles = vec![PostArticle::new(detail(10, 1, "first"))];

        assert_eq!(app.articles[0].toggle_button_label(), SHOW_COMMENTS_LABEL);
        assert_eq!(app.toggle_comments(PostId(10)), Some(true));
        assert_eq!(app.articles[0].toggle_button_label(), HIDE_COMMENTS_LABEL);
        assert_eq!(app.toggle_comments(PostId(10)), Some(false));
        assert_eq!(app.articles[0].toggle_button_label(), SHOW_COMMENTS_LABEL);
        assert!(!app.articles[0].comments_visible);
    }

    #[test]
    fn toggling_an_unknown_post_is_a_no_op() {
        let (mut app, _cmd_rx, _ui_tx) = test_app();
        app.articles = vec![PostArticle::new(detail(10, 1, "first"))];

        assert_eq!(app.toggle_comments(PostId(99)), None);
        assert!(!app.articles[0].comments_visible);
    }

    #[test]
    fn article_text_lines_match_render_contract() {
        let article = PostArticle::new(detail(10, 1, "T"));

        assert_eq!(article.id_line(), "Post ID: 10");
        assert_eq!(article.author_line(), "Author: Alice with Alice Co");
        assert_eq!(article.catch_phrase(), Some("Alice catchphrase"));
        assert_eq!(
            comment_footer(&article.detail.comments[0]),
            "From: commenter@example.com"
        );
    }

    #[test]
    fn missing_author_renders_fallback_line() {
        let mut degraded = detail(10, 1, "T");
        degraded.author = None;
        let article = PostArticle::new(degraded);

        assert_eq!(article.author_line(), "Author unavailable");
        assert_eq!(article.catch_phrase(), None);
    }

    #[test]
    fn load_users_error_raises_a_banner_and_status() {
        use crate::controller::events::{UiError, UiErrorContext};

        let (mut app, _cmd_rx, ui_tx) = test_app();
        ui_tx
            .try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::LoadUsers,
                "users request failed: connection refused",
            )))
            .expect("send error");
        app.process_ui_events();

        assert!(app.status.starts_with("Network error:"));
        assert!(app.status_banner.is_some());
    }
}
