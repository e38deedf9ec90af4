// /app.rs
use crate::context::Context;
use crate::tui::{Tui, TuiEvent};
use crate::ui::{ChatScreen, Component};
use crate::{
    completion::{CompletionClient, OllamaClient, complete_cancellable},
    error::CompletionError,
    role::Role,
    session::{PendingTurn, SessionController},
    settings::Settings,
    ui::spinner::Spinner,
};

use color_eyre::eyre::Result;
use crossterm::event::{KeyEvent, KeyEventKind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub enum Action {
    Quit,
    Submit(String),
    SelectRole(Role),
    Reset,
    Stop,
    CompletionFinished(Box<PendingTurn>, Result<String, CompletionError>),
}

pub struct App {
    // Application state and control flow
    running: bool,
    component: Box<dyn Component>,

    // --- Session
    controller: SessionController<OllamaClient>,
    model: String,
    in_flight: Option<CancellationToken>,

    // --- UI elements
    spinner: Spinner,

    action_sender: mpsc::UnboundedSender<Action>,
    action_receiver: mpsc::UnboundedReceiver<Action>,
}

fn context<'a>(
    controller: &'a SessionController<OllamaClient>,
    model: &'a str,
    spinner: &'a Spinner,
) -> Context<'a> {
    Context {
        messages: controller.messages(),
        role: controller.role(),
        conversation: controller.conversation_id(),
        model,
        busy: controller.is_busy(),
        spinner,
    }
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let (action_sender, action_receiver) = mpsc::unbounded_channel();
        let client = Arc::new(OllamaClient::from_settings(&settings));

        log::info!("Using model {} at {}", client.model(), client.host());

        Self {
            running: true,
            component: Box::new(ChatScreen::new()),

            controller: SessionController::new(client, settings.memory_limit()),
            model: settings.model,
            in_flight: None,

            spinner: Spinner::new(),

            action_sender,
            action_receiver,
        }
    }

    // Asynchronous function to continuously run and update the application.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?
            .tick_rate(10.0) // spinner speed
            .frame_rate(30.0);

        tui.enter()?; // Starts event handler, enters raw mode, enters alternate screen

        while self.running {
            tokio::select! {
                maybe_event = tui.next() => match maybe_event {
                    Some(event) => self.handle_tui_event(&mut tui, event)?,
                    None => break,
                },
                Some(action) = self.action_receiver.recv() => self.handle_action(action),
            }
        }

        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }

        tui.exit()?; // stops event handler, exits raw mode, exits alternate screen
        Ok(())
    }

    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| {
            let context = context(&self.controller, &self.model, &self.spinner);
            self.component
                .render(frame.area(), frame.buffer_mut(), &context)
        })?;
        Ok(())
    }

    fn handle_tui_event(&mut self, tui: &mut Tui, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.on_key(key_event)
            }
            TuiEvent::Tick => {
                if self.controller.is_busy() {
                    self.spinner.next_frame();
                }
            }
            TuiEvent::Render | TuiEvent::Init | TuiEvent::Resize(_, _) => self.draw(tui)?,
            TuiEvent::Error => log::warn!("Terminal event stream reported an error"),
            TuiEvent::Key(_) => {}
            TuiEvent::Paste(_) => {}
            TuiEvent::Mouse(_) => {}
            TuiEvent::FocusGained => {}
            TuiEvent::FocusLost => {}
        }
        Ok(())
    }

    fn on_key(&mut self, key_event: KeyEvent) {
        let context = context(&self.controller, &self.model, &self.spinner);
        if let Some(action) = self.component.on_key(key_event, &context) {
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.quit(),
            Action::Submit(input) => self.submit(&input),
            Action::SelectRole(role) => self.controller.select_role(role),
            Action::Reset => match self.controller.reset() {
                Ok(id) => log::info!("Started conversation {id}"),
                Err(e) => log::warn!("Reset refused: {e}"),
            },
            Action::Stop => {
                if let Some(token) = self.in_flight.take() {
                    log::info!("Stopping in-flight request");
                    token.cancel();
                }
            }
            Action::CompletionFinished(pending, result) => {
                self.in_flight = None;
                self.controller.finish_turn(*pending, result);
            }
        }
    }

    // The user message is recorded before the backend is called, so it renders
    // on the next frame while the reply is still pending.
    fn submit(&mut self, input: &str) {
        let pending = match self.controller.begin_turn(input) {
            Ok(Some(pending)) => pending,
            Ok(None) => return,
            Err(e) => {
                log::warn!("Submit refused: {e}");
                return;
            }
        };

        let client = self.controller.client();
        let sender = self.action_sender.clone();
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        tokio::spawn(async move {
            let result = complete_cancellable(client.as_ref(), &pending.prompt, &token).await;
            if sender
                .send(Action::CompletionFinished(Box::new(pending), result))
                .is_err()
            {
                log::debug!("App closed before the completion finished");
            }
        });
    }

    fn quit(&mut self) {
        self.running = false;
    }
}
