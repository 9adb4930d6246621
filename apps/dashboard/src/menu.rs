use shared::domain::CompanyId;

pub const COMPANIES_PER_GROUP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Person,
    Companies,
    Overview,
}

impl MenuOption {
    pub const ALL: [MenuOption; 3] = [Self::Person, Self::Companies, Self::Overview];

    pub fn label(self) -> &'static str {
        match self {
            Self::Person => "Persona",
            Self::Companies => "Compañía",
            Self::Overview => "Resumen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuView {
    Root { active: Option<MenuOption> },
    Groups,
    Companies { group: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyGroup {
    pub label: String,
    pub companies: Vec<CompanyId>,
}

pub fn company_groups(ids: &[CompanyId]) -> Vec<CompanyGroup> {
    ids.chunks(COMPANIES_PER_GROUP)
        .filter_map(|chunk| {
            let (first, last) = (chunk.first()?, chunk.last()?);
            Some(CompanyGroup {
                label: format!("{first}-{last}"),
                companies: chunk.to_vec(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuInput {
    Press(MenuOption),
    PickGroup(usize),
    /// Index into the group's companies; one past the end is the back entry.
    PickCompany(usize),
    Type(String),
    Submit,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuSelection {
    Company(CompanyId),
    Person(String),
    Overview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    Stay,
    Select(MenuSelection),
    Close,
}

#[derive(Debug, Clone)]
pub struct Menu {
    view: MenuView,
    input: Option<String>,
    groups: Vec<CompanyGroup>,
}

impl Menu {
    pub fn new(groups: Vec<CompanyGroup>) -> Self {
        Self {
            view: MenuView::Root { active: None },
            input: None,
            groups,
        }
    }

    pub fn view(&self) -> MenuView {
        self.view
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub fn groups(&self) -> &[CompanyGroup] {
        &self.groups
    }

    pub fn current_group(&self) -> Option<&CompanyGroup> {
        match self.view {
            MenuView::Companies { group } => self.groups.get(group),
            _ => None,
        }
    }

    /// Replaces the groups; a company list whose group vanished falls back to the group list.
    pub fn set_groups(&mut self, groups: Vec<CompanyGroup>) {
        self.groups = groups;
        if let MenuView::Companies { group } = self.view {
            if group >= self.groups.len() {
                self.view = MenuView::Groups;
            }
        }
    }

    pub fn handle(&mut self, input: MenuInput) -> MenuOutcome {
        match input {
            MenuInput::Press(option) => self.press(option),
            MenuInput::PickGroup(index) => {
                if self.view == MenuView::Groups && index < self.groups.len() {
                    self.view = MenuView::Companies { group: index };
                }
                MenuOutcome::Stay
            }
            MenuInput::PickCompany(index) => {
                let Some(group) = self.current_group() else {
                    return MenuOutcome::Stay;
                };
                match group.companies.get(index) {
                    Some(id) => MenuOutcome::Select(MenuSelection::Company(*id)),
                    None if index == group.companies.len() => {
                        self.view = MenuView::Groups;
                        MenuOutcome::Stay
                    }
                    None => MenuOutcome::Stay,
                }
            }
            MenuInput::Type(text) => {
                if let Some(buffer) = self.input.as_mut() {
                    *buffer = text;
                }
                MenuOutcome::Stay
            }
            MenuInput::Submit => {
                let name = match self.input.as_deref().map(str::trim) {
                    Some(name) if !name.is_empty() => name.to_string(),
                    _ => return MenuOutcome::Stay,
                };
                self.input = None;
                MenuOutcome::Select(MenuSelection::Person(name))
            }
            MenuInput::Escape => self.escape(),
        }
    }

    fn press(&mut self, option: MenuOption) -> MenuOutcome {
        if self.view != (MenuView::Root { active: Some(option) }) {
            self.view = MenuView::Root {
                active: Some(option),
            };
            self.input = None;
            return MenuOutcome::Stay;
        }

        match option {
            MenuOption::Person => {
                self.input.get_or_insert_with(String::new);
                MenuOutcome::Stay
            }
            MenuOption::Companies => {
                self.input = None;
                self.view = MenuView::Groups;
                MenuOutcome::Stay
            }
            MenuOption::Overview => MenuOutcome::Select(MenuSelection::Overview),
        }
    }

    fn escape(&mut self) -> MenuOutcome {
        if self.input.take().is_some() {
            return MenuOutcome::Stay;
        }
        match self.view {
            MenuView::Companies { .. } => {
                self.view = MenuView::Groups;
                MenuOutcome::Stay
            }
            MenuView::Groups => {
                self.view = MenuView::Root {
                    active: Some(MenuOption::Companies),
                };
                MenuOutcome::Stay
            }
            MenuView::Root { .. } => MenuOutcome::Close,
        }
    }
}

/// Turns one typed line into menu inputs. Option words open their view
/// directly, so they press twice unless the option is already active.
pub fn commands_for(line: &str, menu: &Menu) -> Vec<MenuInput> {
    let line = line.trim();

    if menu.input().is_some() {
        return match line {
            "" | "esc" => vec![MenuInput::Escape],
            text => vec![MenuInput::Type(text.to_string()), MenuInput::Submit],
        };
    }

    let option = match line.to_lowercase().as_str() {
        "p" | "persona" => Some(MenuOption::Person),
        "c" | "compañia" | "compania" => Some(MenuOption::Companies),
        "r" | "resumen" => Some(MenuOption::Overview),
        "esc" | "atras" | "q" => return vec![MenuInput::Escape],
        _ => None,
    };
    if let Some(option) = option {
        let press = MenuInput::Press(option);
        return if menu.view() == (MenuView::Root { active: Some(option) }) {
            vec![press]
        } else {
            vec![press.clone(), press]
        };
    }

    let Ok(number) = line.parse::<usize>() else {
        return Vec::new();
    };
    let Some(index) = number.checked_sub(1) else {
        return Vec::new();
    };
    match menu.view() {
        MenuView::Groups => vec![MenuInput::PickGroup(index)],
        MenuView::Companies { .. } => vec![MenuInput::PickCompany(index)],
        MenuView::Root { .. } => Vec::new(),
    }
}

#[cfg(test)]
#[path = "tests/menu_tests.rs"]
mod tests;
