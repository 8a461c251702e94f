// ABOUTME: Workspace state: procedure registry, frame stack and REPL line machinery

use crate::builtins::register_builtins;
use crate::config;
use crate::error::{Error, ErrorKind};
use crate::eval::eval_node_stream;
use crate::files::Files;
use crate::frame::{no_interpreted_frame, Frame, FrameKind, VarList};
use crate::node::{Node, KEYWORD_TO};
use crate::parser::parse;
use crate::procedure::{
    read_procedure, BuiltinFn, BuiltinProcedure, InterpretedProcedure, Procedure,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    pub prefix: PathBuf,
    pub trace: bool,
    /// Screen size requested on the command line; zero means full
    /// screen. The core records it for the graphical front end.
    pub screen: (u32, u32),
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig {
            prefix: config::default_prefix(),
            trace: false,
            screen: (0, 0),
        }
    }
}

/// Which prompt the REPL should show next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Normal,
    Defining,
    Continuation,
}

/// The process-wide interpreter state: procedure map, frame stack, file
/// registry, trace flag and the REPL's line-assembly state.
pub struct Workspace {
    pub(crate) procedures: HashMap<String, Procedure>,
    pub(crate) frames: Vec<Frame>,
    pub files: Files,
    pub screen_size: (u32, u32),
    trace_enabled: bool,
    quit: bool,
    interrupted: Arc<AtomicBool>,
    defining: bool,
    partial: String,
}

impl Workspace {
    pub fn new(config: WorkspaceConfig) -> Result<Self, Error> {
        let mut ws = Workspace {
            procedures: HashMap::new(),
            frames: vec![Frame::root()],
            files: Files::new(&config.prefix)?,
            screen_size: config.screen,
            trace_enabled: config.trace,
            quit: false,
            interrupted: Arc::new(AtomicBool::new(false)),
            defining: false,
            partial: String::new(),
        };
        register_builtins(&mut ws);
        Ok(ws)
    }

    // ========================================================================
    // Procedure registry
    // ========================================================================

    pub fn register_builtin(
        &mut self,
        long_name: &'static str,
        short_name: &'static str,
        params: usize,
        func: BuiltinFn,
    ) {
        self.register(long_name, short_name, params, false, func);
    }

    /// Register a primitive that consumes every remaining expression
    /// when called as the first word of a group.
    pub fn register_variadic(
        &mut self,
        long_name: &'static str,
        short_name: &'static str,
        params: usize,
        func: BuiltinFn,
    ) {
        self.register(long_name, short_name, params, true, func);
    }

    fn register(
        &mut self,
        long_name: &'static str,
        short_name: &'static str,
        params: usize,
        variadic: bool,
        func: BuiltinFn,
    ) {
        let proc = Procedure::Builtin(Rc::new(BuiltinProcedure {
            name: long_name,
            params,
            variadic,
            func,
        }));
        self.procedures.insert(long_name.to_string(), proc.clone());
        if !short_name.is_empty() {
            self.procedures.insert(short_name.to_string(), proc);
        }
    }

    pub fn add_procedure(&mut self, proc: InterpretedProcedure) {
        self.procedures
            .insert(proc.name.clone(), Procedure::Interpreted(Rc::new(proc)));
    }

    /// Look up an upper-cased procedure name.
    pub fn find_procedure(&self, name: &str) -> Option<Procedure> {
        self.procedures.get(name).cloned()
    }

    // ========================================================================
    // Frame stack
    // ========================================================================

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) {
        debug_assert!(self.frames.len() > 1, "the root frame is never popped");
        self.frames.pop();
    }

    pub fn top_frame_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("frame stack is never empty")
    }

    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub(crate) fn root_vars(&self) -> &VarList {
        &self.frames[0].vars
    }

    pub(crate) fn root_vars_mut(&mut self) -> &mut VarList {
        &mut self.frames[0].vars
    }

    /// The nearest non-builtin frame: the scope MAKE, LOCAL and TEST
    /// address when invoked from a primitive's frame.
    fn active_scope(&self) -> usize {
        self.frames
            .iter()
            .rposition(|f| !f.is_builtin())
            .expect("the root frame is never popped")
    }

    fn interpreted_index(&self) -> Option<usize> {
        self.frames.iter().rposition(Frame::is_interpreted)
    }

    /// The procedure record of the enclosing interpreted frame.
    pub fn enclosing_procedure(&self) -> Option<Rc<InterpretedProcedure>> {
        let ix = self.interpreted_index()?;
        match &self.frames[ix].kind {
            FrameKind::Interpreted { procedure, .. } => Some(procedure.clone()),
            _ => None,
        }
    }

    /// OUTPUT: store the return value on the enclosing interpreted frame
    /// and mark it stopped.
    pub fn set_return_value(&mut self, value: Node) -> Result<(), Error> {
        let Some(ix) = self.interpreted_index() else {
            return Err(self.no_frame_error());
        };
        if let FrameKind::Interpreted {
            return_value,
            stopped,
            ..
        } = &mut self.frames[ix].kind
        {
            *return_value = Some(value);
            *stopped = true;
        }
        Ok(())
    }

    /// STOP: mark the enclosing interpreted frame stopped.
    pub fn signal_stop(&mut self) -> Result<(), Error> {
        let Some(ix) = self.interpreted_index() else {
            return Err(self.no_frame_error());
        };
        if let FrameKind::Interpreted { stopped, .. } = &mut self.frames[ix].kind {
            *stopped = true;
        }
        Ok(())
    }

    fn no_frame_error(&self) -> Error {
        match self.frames.last().and_then(|f| f.caller.as_ref()) {
            Some(caller) => no_interpreted_frame(caller),
            None => Error::new(ErrorKind::NoInterpretedFrame(String::new())),
        }
    }

    pub fn take_return_value(&mut self) -> Option<Node> {
        match &mut self.top_frame_mut().kind {
            FrameKind::Interpreted { return_value, .. } => return_value.take(),
            _ => None,
        }
    }

    pub fn top_interpreted_stopped(&self) -> bool {
        matches!(
            self.frames.last().map(|f| &f.kind),
            Some(FrameKind::Interpreted { stopped: true, .. })
        )
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Dynamic lookup: search the frame stack top-down.
    pub fn get_variable(&self, name: &str) -> Option<Node> {
        let key = name.to_uppercase();
        for frame in self.frames.iter().rev() {
            if let Some(var) = frame.vars.get(&key) {
                return var.value.clone();
            }
        }
        None
    }

    /// Assign: mutate the binding wherever it lives; unknown names
    /// become globals on the root frame.
    pub fn set_variable(&mut self, name: &str, value: Node) {
        let key = name.to_uppercase();
        let target = self
            .frames
            .iter()
            .rposition(|f| f.vars.contains(&key))
            .unwrap_or(0);
        self.frames[target].vars.set(name, value);
    }

    /// LOCAL: a fresh valueless binding in the caller's frame, shadowing
    /// any outer binding.
    pub fn create_local(&mut self, name: &str) {
        let ix = self.active_scope();
        self.frames[ix].vars.declare(name);
    }

    pub fn set_test_value(&mut self, value: bool) {
        let ix = self.active_scope();
        self.frames[ix].test_value = Some(value);
    }

    pub fn test_value(&self) -> Option<bool> {
        self.frames[self.active_scope()].test_value
    }

    // ========================================================================
    // Property lists
    // ========================================================================

    fn variable_index(&self, key: &str) -> Option<usize> {
        self.frames.iter().rposition(|f| f.vars.contains(key))
    }

    pub fn set_property(&mut self, name: &str, prop: &str, value: Node) {
        let key = name.to_uppercase();
        let ix = self.variable_index(&key).unwrap_or(0);
        let var = self.frames[ix].vars.declare(name);
        var.props
            .get_or_insert_with(HashMap::new)
            .insert(prop.to_uppercase(), value);
    }

    pub fn get_property(&self, name: &str, prop: &str) -> Option<Node> {
        let key = name.to_uppercase();
        let ix = self.variable_index(&key)?;
        self.frames[ix]
            .vars
            .get(&key)?
            .props
            .as_ref()?
            .get(&prop.to_uppercase())
            .cloned()
    }

    pub fn remove_property(&mut self, name: &str, prop: &str) {
        let key = name.to_uppercase();
        if let Some(ix) = self.variable_index(&key) {
            if let Some(props) = self.frames[ix]
                .vars
                .get_mut(&key)
                .and_then(|v| v.props.as_mut())
            {
                props.remove(&prop.to_uppercase());
            }
        }
    }

    /// All properties of a variable, sorted by name.
    pub fn properties(&self, name: &str) -> Vec<(String, Node)> {
        let key = name.to_uppercase();
        let mut out = Vec::new();
        if let Some(ix) = self.variable_index(&key) {
            if let Some(props) = self.frames[ix].vars.get(&key).and_then(|v| v.props.as_ref()) {
                out = props.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                out.sort_by(|a, b| a.0.cmp(&b.0));
            }
        }
        out
    }

    /// ERPROPS: drop every property list on the root frame.
    pub fn clear_properties(&mut self) {
        for var in self.root_vars_mut().values_mut() {
            var.props = None;
        }
    }

    // ========================================================================
    // Output, tracing, interrupts
    // ========================================================================

    pub fn print(&mut self, text: &str) {
        let _ = self.files.write(text);
    }

    pub fn begin_capture(&mut self) {
        self.files.begin_capture();
    }

    pub fn take_capture(&mut self) -> String {
        self.files.take_capture()
    }

    pub fn set_trace(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    pub(crate) fn trace_call(&mut self, name: &str) {
        if self.trace_enabled {
            let line = format!("{}> {}\n", " ".repeat(self.depth()), name);
            self.print(&line);
        }
    }

    /// A shared flag the host may set to abort the running program; the
    /// evaluator polls it between instructions.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    pub fn check_interrupt(&self) -> Result<(), Error> {
        if self.interrupted.swap(false, Ordering::SeqCst) {
            return Err(Error::new(ErrorKind::UserStopped));
        }
        Ok(())
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    // ========================================================================
    // Evaluation entry points
    // ========================================================================

    /// Parse and evaluate one chunk of top-level source. Values are not
    /// permitted to survive to the top level.
    pub fn evaluate(&mut self, source: &str) -> Result<(), Error> {
        let nodes = parse(source)?;
        eval_node_stream(self, &nodes, false)?;
        Ok(())
    }

    /// Feed one input line through the REPL state machine: procedure
    /// definitions accumulate until END, `~` continues a statement, and
    /// anything else evaluates.
    pub fn feed_line(&mut self, line: &str) -> Result<(), Error> {
        let upper = line.trim().to_uppercase();

        if self.defining {
            self.partial.push('\n');
            self.partial.push_str(line);
            if upper == crate::node::KEYWORD_END {
                let source = std::mem::take(&mut self.partial);
                self.defining = false;
                self.define_from_source(source)?;
            }
            return Ok(());
        }

        if line.trim().is_empty() {
            return Ok(());
        }

        if upper == KEYWORD_TO || upper.starts_with("TO ") {
            self.defining = true;
            self.partial = line.to_string();
            return Ok(());
        }

        let combined = if self.partial.is_empty() {
            line.to_string()
        } else {
            format!("{}\n{}", self.partial, line)
        };
        if let Some(stripped) = combined.strip_suffix('~') {
            self.partial = stripped.to_string();
            return Ok(());
        }

        self.partial.clear();
        self.evaluate(&combined)
    }

    fn define_from_source(&mut self, source: String) -> Result<(), Error> {
        let nodes = parse(&source)?;
        let mut ix = 0;
        let mut proc = read_procedure(&nodes, &mut ix)?;
        proc.source = source;
        let name = proc.name.clone();
        self.add_procedure(proc);
        self.print(&format!("{} defined.\n", name));
        Ok(())
    }

    /// Feed a whole source text line by line, exactly as the REPL would.
    pub fn read_source(&mut self, text: &str) -> Result<(), Error> {
        for line in text.lines() {
            self.feed_line(line)?;
        }
        Ok(())
    }

    /// Which prompt the REPL should show next.
    pub fn mode(&self) -> ReplMode {
        if self.defining {
            ReplMode::Defining
        } else if !self.partial.is_empty() {
            ReplMode::Continuation
        } else {
            ReplMode::Normal
        }
    }

    /// Abandon a half-entered definition or continuation (Ctrl-C).
    pub fn cancel_pending(&mut self) {
        self.defining = false;
        self.partial.clear();
    }
}

#[cfg(test)]
pub(crate) fn scratch_workspace() -> (tempfile::TempDir, Workspace) {
    let dir = tempfile::TempDir::new().unwrap();
    let config = WorkspaceConfig {
        prefix: dir.path().to_path_buf(),
        trace: false,
        screen: (0, 0),
    };
    let mut ws = Workspace::new(config).unwrap();
    ws.begin_capture();
    (dir, ws)
}
