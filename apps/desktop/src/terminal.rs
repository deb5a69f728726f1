//! Line-oriented host toolkit: every window is a text panel and the event
//! loop reads commands from stdin or a script.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    io::{self, BufRead, Write},
    rc::Rc,
};

use mvc_core::{MvcResult, Toolkit, Window};
use shared::{ActionMode, WindowId};
use tracing::{debug, error, warn};

use crate::{
    commands::{Command, HELP},
    widgets::{Panel, Widget},
};

pub struct Terminal {
    input: RefCell<Box<dyn BufRead>>,
    /// Echo commands read from a script.
    echo: bool,
    windows: RefCell<Vec<Window>>,
    focus: Cell<Option<WindowId>>,
    modal: RefCell<Vec<WindowId>>,
    results: RefCell<HashMap<WindowId, ActionMode>>,
    main: RefCell<Option<Window>>,
    quitting: Cell<bool>,
}

fn panel_of(window: &Window) -> Option<Rc<Panel>> {
    window.native().and_then(|native| native.downcast::<Panel>().ok())
}

impl Terminal {
    pub fn new(input: Box<dyn BufRead>, echo: bool) -> Rc<Self> {
        Rc::new(Self {
            input: RefCell::new(input),
            echo,
            windows: RefCell::new(Vec::new()),
            focus: Cell::new(None),
            modal: RefCell::new(Vec::new()),
            results: RefCell::new(HashMap::new()),
            main: RefCell::new(None),
            quitting: Cell::new(false),
        })
    }

    pub fn windows(&self) -> Vec<Window> {
        self.windows.borrow().clone()
    }

    fn window(&self, id: WindowId) -> Option<Window> {
        self.windows.borrow().iter().find(|window| window.id() == id).cloned()
    }

    fn focused(&self) -> Option<Window> {
        self.focus.get().and_then(|id| self.window(id))
    }

    fn open(&self, window: &Window) {
        self.windows.borrow_mut().push(window.clone());
        self.focus.set(Some(window.id()));
    }

    /// Reads and executes one command; `false` once input is exhausted.
    fn step(&self) -> bool {
        if !self.echo {
            let label = self.focus.get().map(|id| id.to_string()).unwrap_or_default();
            print!("{label}> ");
            let _ = io::stdout().flush();
        }
        let mut line = String::new();
        let read = self.input.borrow_mut().read_line(&mut line);
        match read {
            Ok(0) => return false,
            Ok(_) => {}
            Err(err) => {
                error!(error = %err, "failed to read command");
                return false;
            }
        }
        if self.echo && !line.trim().is_empty() {
            println!("> {}", line.trim_end());
        }

        match Command::parse(&line) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => {}
            Err(err) => println!("error: {err}"),
        }
        true
    }

    /// Pumps commands until `done` holds or input runs out.
    fn pump(&self, done: impl Fn() -> bool) {
        while !self.quitting.get() && !done() {
            if !self.step() {
                break;
            }
        }
    }

    fn execute(&self, command: Command) {
        debug!(?command, "terminal command");
        match command {
            Command::Help => println!("{HELP}"),
            Command::List => self.list(),
            Command::Show => match self.focused() {
                Some(window) => self.render(&window),
                None => println!("no window has focus"),
            },
            Command::Focus(id) => self.focus_window(id),
            Command::Set { control, text } => {
                if let Some(widget) = self.widget(&control) {
                    report(widget.input(&text));
                }
            }
            Command::Pick { control, index } => {
                if let Some(widget) = self.widget(&control) {
                    report(widget.pick(index));
                }
            }
            Command::Click { control } => {
                if let Some(widget) = self.widget(&control) {
                    report(widget.click());
                }
            }
            Command::Close(code) => match self.focused() {
                Some(window) => self.close(&window, code),
                None => println!("no window has focus"),
            },
            Command::Quit => self.quit(),
        }
    }

    fn list(&self) {
        let modal = self.modal.borrow();
        for window in self.windows.borrow().iter() {
            let marker = if self.focus.get() == Some(window.id()) { '*' } else { ' ' };
            let kind = if modal.contains(&window.id()) { " (dialog)" } else { "" };
            println!("{marker} {} {}{kind}", window.id(), window.view_key());
        }
    }

    fn render(&self, window: &Window) {
        match panel_of(window) {
            Some(panel) => println!("{} {}", window.id(), panel.render()),
            None => println!("{} {} (no surface)", window.id(), window.view_key()),
        }
    }

    fn focus_window(&self, id: WindowId) {
        if let Some(top) = self.modal.borrow().last() {
            if *top != id {
                println!("close dialog {top} first");
                return;
            }
        }
        match self.window(id) {
            Some(window) => {
                self.focus.set(Some(id));
                self.render(&window);
            }
            None => println!("no window {id}"),
        }
    }

    fn widget(&self, name: &str) -> Option<Rc<dyn Widget>> {
        let Some(window) = self.focused() else {
            println!("no window has focus");
            return None;
        };
        let widget = panel_of(&window).and_then(|panel| panel.widget(name));
        if widget.is_none() {
            println!("{} has no control '{name}'", window.id());
        }
        widget
    }

    fn close(&self, window: &Window, code: ActionMode) {
        let id = window.id();
        if self.modal.borrow().contains(&id) {
            self.results.borrow_mut().insert(id, code);
        }
        self.windows.borrow_mut().retain(|open| open.id() != id);
        window.notify_closed();
        println!("closed {id}");

        let was_main = self.main.borrow().as_ref().is_some_and(|main| main.id() == id);
        if was_main {
            self.quit();
            return;
        }
        let next = self.windows.borrow().last().map(Window::id);
        self.focus.set(next);
    }

    /// Closes every window, newest first.
    fn quit(&self) {
        self.quitting.set(true);
        let windows: Vec<Window> = self.windows.borrow_mut().drain(..).rev().collect();
        for window in windows {
            window.notify_closed();
        }
        self.focus.set(None);
    }
}

fn report(result: MvcResult<()>) {
    match result {
        Ok(()) => {}
        Err(err) if err.is_recoverable() => {
            warn!(error = %err, "input rejected");
            println!("rejected: {err}");
        }
        Err(err) => {
            error!(kind = ?err.kind(), error = %err, "action failed");
            println!("error: {err}");
        }
    }
}

impl Toolkit for Terminal {
    fn open_windows(&self) -> usize {
        self.windows.borrow().len()
    }

    fn mdi_container(&self) -> Option<Window> {
        self.windows
            .borrow()
            .iter()
            .find(|window| panel_of(window).is_some_and(|panel| panel.container))
            .cloned()
    }

    fn show(&self, window: &Window, parent: Option<&Window>) {
        self.open(window);
        match parent {
            Some(parent) => println!("opened {} {} in {}", window.view_key(), window.id(), parent.id()),
            None => println!("opened {} {}", window.view_key(), window.id()),
        }
        self.render(window);
    }

    fn activate(&self, window: &Window) {
        if let Some(top) = self.modal.borrow().last() {
            if *top != window.id() {
                return;
            }
        }
        self.focus.set(Some(window.id()));
        self.render(window);
    }

    fn show_modal(&self, window: &Window) -> ActionMode {
        let id = window.id();
        let previous = self.focus.get();
        self.modal.borrow_mut().push(id);
        self.open(window);
        println!("dialog {} {}", window.view_key(), id);
        self.render(window);

        self.pump(|| self.window(id).is_none());

        self.modal.borrow_mut().retain(|open| *open != id);
        self.windows.borrow_mut().retain(|open| open.id() != id);
        if !self.quitting.get() {
            self.focus.set(previous.filter(|previous| self.window(*previous).is_some()));
        }
        self.results.borrow_mut().remove(&id).unwrap_or(ActionMode::Cancel)
    }

    fn run(&self, window: &Window) {
        *self.main.borrow_mut() = Some(window.clone());
        self.open(window);
        self.render(window);
        self.pump(|| self.windows.borrow().is_empty());
    }
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("windows", &self.windows.borrow().len())
            .field("focus", &self.focus.get())
            .finish()
    }
}
