//! Record labels.
//!
//! A record label such as `<in>name|{a|b}|<out>` describes a row of fields. `|` separates
//! fields, `{ ... }` nests a group whose fields stack in the other direction, `<port>` names the
//! next field and `\` escapes the following character. The compiler produces a [`CellTree`]: an
//! arena whose root is cell `0` and where every child has a larger id than its parent.

use crate::error::{Error, Result};
use crate::model::{Point, Rect, Size};
use crate::shape::TextMeasurer;
use serde::Serialize;

pub type CellId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Children side by side, left to right.
    #[default]
    Horizontal,
    /// Children stacked top to bottom.
    Vertical,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub direction: Direction,
    pub children: Vec<CellId>,
    pub text: Option<String>,
    pub port: Option<String>,
    /// Top-left corner relative to the origin passed to [`CellTree::place`].
    pub offset: Point,
    pub size: Size,
}

impl Cell {
    fn new(direction: Direction, port: Option<String>) -> Self {
        Self {
            direction,
            children: Vec::new(),
            text: None,
            port,
            offset: Point::default(),
            size: Size::default(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.offset.x, self.offset.y, self.size.width, self.size.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellTree {
    cells: Vec<Cell>,
}

pub fn compile(input: Option<&str>) -> Result<CellTree> {
    compile_with_direction(input, Direction::Horizontal)
}

pub fn compile_with_direction(input: Option<&str>, root: Direction) -> Result<CellTree> {
    let Some(input) = input else {
        return Err(Error::label_format(0, "record label is missing"));
    };
    Parser::new(input, root).run()
}

/// The field currently being read inside one open group.
#[derive(Debug, Default)]
struct Field {
    text: String,
    port: Option<String>,
    /// Set once a `{ ... }` group has been closed as this field.
    group: Option<CellId>,
}

impl Field {
    fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

struct Frame {
    cell: CellId,
    field: Field,
    opened_at: usize,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    cells: Vec<Cell>,
    stack: Vec<Frame>,
}

impl Parser {
    fn new(input: &str, root: Direction) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            cells: vec![Cell::new(root, None)],
            stack: vec![Frame {
                cell: 0,
                field: Field::default(),
                opened_at: 0,
            }],
        }
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn run(mut self) -> Result<CellTree> {
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            match c {
                '\\' => {
                    let Some(&next) = self.chars.get(self.pos + 1) else {
                        return Err(Error::label_format(self.pos, "`\\` at end of label"));
                    };
                    self.push_text(next)?;
                    self.pos += 2;
                    continue;
                }
                '<' => self.read_port()?,
                '{' => self.open_group()?,
                '}' => {
                    if self.stack.len() == 1 {
                        let rest_is_closing = self.chars[self.pos..]
                            .iter()
                            .all(|c| *c == '}' || c.is_whitespace());
                        if rest_is_closing {
                            break;
                        }
                        return Err(Error::label_format(self.pos, "unmatched `}`"));
                    }
                    self.close_group();
                }
                '|' => self.finish_field(),
                '>' => return Err(Error::label_format(self.pos, "`>` outside a port tag")),
                _ => self.push_text(c)?,
            }
            self.pos += 1;
        }

        if self.stack.len() > 1 {
            let at = self.top().opened_at;
            return Err(Error::label_format(at, "unmatched `{`"));
        }
        self.finish_field();
        Ok(CellTree { cells: self.cells })
    }

    fn push_text(&mut self, c: char) -> Result<()> {
        let pos = self.pos;
        let field = &mut self.top().field;
        if field.group.is_some() {
            if c.is_whitespace() {
                return Ok(());
            }
            return Err(Error::label_format(pos, "text after a closed group"));
        }
        field.text.push(c);
        Ok(())
    }

    fn read_port(&mut self) -> Result<()> {
        let start = self.pos;
        {
            let field = &self.top().field;
            if field.has_text() || field.group.is_some() || field.port.is_some() {
                return Err(Error::label_format(start, "port tag must start a field"));
            }
        }
        let mut name = String::new();
        self.pos += 1;
        loop {
            match self.chars.get(self.pos).copied() {
                None => return Err(Error::label_format(start, "unterminated port tag")),
                Some('>') => break,
                Some('\\') => {
                    let Some(&next) = self.chars.get(self.pos + 1) else {
                        return Err(Error::label_format(self.pos, "`\\` at end of label"));
                    };
                    name.push(next);
                    self.pos += 2;
                }
                Some('{' | '}' | '|' | '<') => {
                    return Err(Error::label_format(start, "unterminated port tag"));
                }
                Some(c) => {
                    name.push(c);
                    self.pos += 1;
                }
            }
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::label_format(start, "empty port tag"));
        }

        // The tag must be followed by field text or a group.
        let mut look = self.pos + 1;
        while self.chars.get(look).is_some_and(|c| c.is_whitespace()) {
            look += 1;
        }
        match self.chars.get(look) {
            None | Some('|' | '}') => {
                return Err(Error::label_format(
                    start,
                    format!("port `{name}` is not followed by a field"),
                ));
            }
            _ => {}
        }
        self.top().field.port = Some(name.to_string());
        Ok(())
    }

    fn open_group(&mut self) -> Result<()> {
        let pos = self.pos;
        let parent = self.top().cell;
        let field = std::mem::take(&mut self.top().field);
        if field.has_text() || field.group.is_some() {
            return Err(Error::label_format(pos, "`{` inside field text"));
        }
        let id = self.cells.len();
        let direction = self.cells[parent].direction.flipped();
        self.cells.push(Cell::new(direction, field.port));
        self.cells[parent].children.push(id);
        self.stack.push(Frame {
            cell: id,
            field: Field::default(),
            opened_at: pos,
        });
        Ok(())
    }

    fn close_group(&mut self) {
        self.finish_field();
        if let Some(frame) = self.stack.pop() {
            self.top().field.group = Some(frame.cell);
        }
    }

    fn finish_field(&mut self) {
        let frame = self.top();
        let parent = frame.cell;
        let field = std::mem::take(&mut frame.field);
        if field.group.is_some() {
            return;
        }
        let text = field.text.trim();
        let direction = self.cells[parent].direction.flipped();
        let mut leaf = Cell::new(direction, field.port);
        leaf.text = (!text.is_empty()).then(|| text.to_string());
        let id = self.cells.len();
        self.cells.push(leaf);
        self.cells[parent].children.push(id);
    }
}

impl CellTree {
    pub const ROOT: CellId = 0;

    pub fn root(&self) -> &Cell {
        &self.cells[Self::ROOT]
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Levels in the tree; the root alone counts as one.
    pub fn depth(&self) -> usize {
        let mut level: Vec<usize> = vec![0; self.cells.len()];
        let mut deepest = 0;
        for id in 0..self.cells.len() {
            if id == Self::ROOT {
                level[id] = 1;
            }
            deepest = deepest.max(level[id]);
            for &child in &self.cells[id].children {
                level[child] = level[id] + 1;
            }
        }
        deepest
    }

    pub fn leaves(&self) -> Vec<CellId> {
        (0..self.cells.len())
            .filter(|&id| id != Self::ROOT && self.cells[id].is_leaf())
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Cell carrying `port`; when a port is declared twice the last declaration wins.
    pub fn cell_by_port(&self, port: &str) -> Option<CellId> {
        (0..self.cells.len())
            .rev()
            .find(|&id| self.cells[id].port.as_deref() == Some(port))
    }

    /// Checks the arena is a tree rooted at cell 0: every cell reached exactly once and every
    /// child stored after its parent.
    pub fn validate(&self) -> Result<()> {
        let mut visited = vec![false; self.cells.len()];
        let mut stack: Vec<CellId> = vec![Self::ROOT];
        let mut seen = 0usize;
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id], true) {
                return Err(Error::invalid_structure(format!("cell {id} is reachable twice")));
            }
            seen += 1;
            for &child in &self.cells[id].children {
                if child <= id || child >= self.cells.len() {
                    return Err(Error::invalid_structure(format!(
                        "cell {id} has out-of-order child {child}"
                    )));
                }
                stack.push(child);
            }
        }
        if seen != self.cells.len() {
            return Err(Error::invalid_structure("record cells are not all reachable"));
        }
        Ok(())
    }

    /// Re-derives directions from a new root direction, alternating by depth.
    pub fn set_root_direction(&mut self, root: Direction) {
        self.cells[Self::ROOT].direction = root;
        for id in 0..self.cells.len() {
            let child_dir = self.cells[id].direction.flipped();
            for i in 0..self.cells[id].children.len() {
                let child = self.cells[id].children[i];
                self.cells[child].direction = child_dir;
            }
        }
    }

    /// Computes natural sizes bottom-up and returns the root size.
    pub fn measure(&mut self, measurer: &dyn TextMeasurer, padding: f64) -> Size {
        for id in (0..self.cells.len()).rev() {
            let size = if self.cells[id].is_leaf() {
                let text = self.cells[id].text.as_deref().unwrap_or("");
                let t = measurer.measure(text).clamped();
                Size::new(t.width + 2.0 * padding, t.height + 2.0 * padding)
            } else {
                let horizontal = self.cells[id].direction == Direction::Horizontal;
                self.cells[id]
                    .children
                    .iter()
                    .fold(Size::default(), |acc, &c| {
                        let s = self.cells[c].size;
                        if horizontal {
                            Size::new(acc.width + s.width, acc.height.max(s.height))
                        } else {
                            Size::new(acc.width.max(s.width), acc.height + s.height)
                        }
                    })
            };
            self.cells[id].size = size;
        }
        self.cells[Self::ROOT].size
    }

    /// Grows the tree to `size`, spreading extra room evenly over each group's children.
    /// Never shrinks below the measured size.
    pub fn resize(&mut self, size: Size) {
        let root = self.cells[Self::ROOT].size.max(size);
        self.cells[Self::ROOT].size = root;
        for id in 0..self.cells.len() {
            let n = self.cells[id].children.len();
            if n == 0 {
                continue;
            }
            let outer = self.cells[id].size;
            let horizontal = self.cells[id].direction == Direction::Horizontal;
            let used: f64 = self.cells[id]
                .children
                .iter()
                .map(|&c| {
                    let s = self.cells[c].size;
                    if horizontal { s.width } else { s.height }
                })
                .sum();
            let extra = ((if horizontal { outer.width } else { outer.height }) - used).max(0.0)
                / n as f64;
            for i in 0..n {
                let c = self.cells[id].children[i];
                let s = &mut self.cells[c].size;
                if horizontal {
                    s.width += extra;
                    s.height = outer.height;
                } else {
                    s.height += extra;
                    s.width = outer.width;
                }
            }
        }
    }

    /// Assigns offsets top-down with the root's top-left corner at `origin`.
    pub fn place(&mut self, origin: Point) {
        self.cells[Self::ROOT].offset = origin;
        for id in 0..self.cells.len() {
            let mut cursor = self.cells[id].offset;
            let horizontal = self.cells[id].direction == Direction::Horizontal;
            for i in 0..self.cells[id].children.len() {
                let c = self.cells[id].children[i];
                self.cells[c].offset = cursor;
                let s = self.cells[c].size;
                if horizontal {
                    cursor.x += s.width;
                } else {
                    cursor.y += s.height;
                }
            }
        }
    }

    pub fn text_of(&self, id: CellId) -> Option<&str> {
        self.cells.get(id).and_then(|c| c.text.as_deref())
    }
}
