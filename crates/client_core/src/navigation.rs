//! Role-based routing: which sections a role sees and which actions are shown.
//!
//! This only shapes the UI. The backend enforces authorization on every call.

use shared::{domain::Role, protocol::EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Overview,
    Properties,
    Contracts,
    Invoices,
    Payments,
    Users,
    Reports,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Overview,
        Section::Properties,
        Section::Contracts,
        Section::Invoices,
        Section::Payments,
        Section::Users,
        Section::Reports,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Properties => "Properties",
            Section::Contracts => "Contracts",
            Section::Invoices => "Invoices",
            Section::Payments => "Payments",
            Section::Users => "Users",
            Section::Reports => "Reports",
        }
    }

    pub fn entity_kind(self) -> Option<EntityKind> {
        match self {
            Section::Properties => Some(EntityKind::Propiedades),
            Section::Contracts => Some(EntityKind::Contratos),
            Section::Invoices => Some(EntityKind::Facturas),
            Section::Payments => Some(EntityKind::Pagos),
            Section::Overview | Section::Users | Section::Reports => None,
        }
    }
}

pub fn sections_for(role: Role) -> &'static [Section] {
    use Section::*;
    match role {
        Role::Administrador => &Section::ALL,
        Role::Propietario => &[Overview, Properties, Contracts, Invoices, Payments, Reports],
        Role::Inquilino => &[Overview, Contracts, Invoices, Payments],
        Role::Contador => &[Overview, Contracts, Invoices, Payments, Reports],
    }
}

pub fn can_access(role: Role, section: Section) -> bool {
    sections_for(role).contains(&section)
}

pub fn landing_section(_role: Role) -> Section {
    Section::Overview
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actions {
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub transition: bool,
}

impl Actions {
    const NONE: Actions = Actions {
        create: false,
        edit: false,
        delete: false,
        transition: false,
    };
    const ALL: Actions = Actions {
        create: true,
        edit: true,
        delete: true,
        transition: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    role: Role,
}

impl Permissions {
    pub fn for_role(role: Role) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn actions(&self, section: Section) -> Actions {
        if !can_access(self.role, section) {
            return Actions::NONE;
        }
        match (self.role, section) {
            (_, Section::Overview | Section::Reports) => Actions::NONE,
            (Role::Administrador, _) => Actions::ALL,
            (Role::Propietario, Section::Properties) => Actions {
                create: true,
                edit: true,
                delete: false,
                transition: true,
            },
            (Role::Propietario, Section::Contracts) => Actions {
                create: true,
                edit: false,
                delete: false,
                transition: true,
            },
            (Role::Inquilino, Section::Payments) => Actions {
                create: true,
                ..Actions::NONE
            },
            (Role::Contador, Section::Invoices) => Actions {
                create: true,
                edit: true,
                delete: false,
                transition: true,
            },
            (Role::Contador, Section::Payments) => Actions {
                create: true,
                edit: false,
                delete: false,
                transition: true,
            },
            _ => Actions::NONE,
        }
    }

    pub fn can_download_reports(&self) -> bool {
        can_access(self.role, Section::Reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_sees_every_section() {
        assert_eq!(sections_for(Role::Administrador), &Section::ALL);
        assert!(Permissions::for_role(Role::Administrador)
            .actions(Section::Users)
            .delete);
    }

    #[test]
    fn tenant_is_limited_to_own_lease_sections() {
        assert!(!can_access(Role::Inquilino, Section::Properties));
        assert!(!can_access(Role::Inquilino, Section::Users));
        assert!(!can_access(Role::Inquilino, Section::Reports));
        assert!(can_access(Role::Inquilino, Section::Payments));

        let perms = Permissions::for_role(Role::Inquilino);
        assert_eq!(
            perms.actions(Section::Payments),
            Actions {
                create: true,
                ..Actions::default()
            }
        );
        assert_eq!(perms.actions(Section::Invoices), Actions::default());
        assert!(!perms.can_download_reports());
    }

    #[test]
    fn owner_cannot_delete_properties_but_can_transition_them() {
        let actions = Permissions::for_role(Role::Propietario).actions(Section::Properties);
        assert!(actions.create && actions.edit && actions.transition);
        assert!(!actions.delete);
    }

    #[test]
    fn accountant_manages_billing_only() {
        let perms = Permissions::for_role(Role::Contador);
        assert!(perms.actions(Section::Invoices).transition);
        assert!(perms.actions(Section::Payments).transition);
        assert_eq!(perms.actions(Section::Contracts), Actions::default());
        assert_eq!(perms.actions(Section::Properties), Actions::default());
    }

    #[test]
    fn every_role_lands_on_an_accessible_section() {
        for role in Role::ALL {
            assert!(can_access(role, landing_section(role)));
        }
    }
}
