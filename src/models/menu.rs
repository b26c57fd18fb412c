// src/models/menu.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::role::Role;

/// Referência de ícone consumida pelo frontend (nomes do conjunto lucide).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    LayoutDashboard,
    Users,
    Building,
    Settings,
    Tractor,
    Package,
    CalendarRange,
    Wrench,
    ClipboardCheck,
    CreditCard,
    FileText,
    Wallet,
    BarChart,
    ShoppingCart,
    CalendarCheck,
    MapPin,
    Wheat,
    UserCircle,
}

/// Entrada estática do menu lateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub icon: Icon,
    pub label: &'static str,
    pub path: &'static str,
}

const fn entry(icon: Icon, label: &'static str, path: &'static str) -> MenuEntry {
    MenuEntry { icon, label, path }
}

const HOME: MenuEntry = entry(Icon::LayoutDashboard, "Painel", "/dashboard");
const PROFILE: MenuEntry = entry(Icon::UserCircle, "Meu perfil", "/dashboard/profile");

const SUPER_ADMIN_MENU: &[MenuEntry] = &[
    HOME,
    entry(Icon::Users, "Usuários", "/dashboard/users"),
    entry(Icon::Building, "Cooperativas", "/dashboard/cooperatives"),
    entry(Icon::Tractor, "Equipamentos", "/dashboard/equipment"),
    entry(Icon::CalendarRange, "Locações", "/dashboard/rentals"),
    entry(Icon::Wrench, "Intervenções", "/dashboard/interventions"),
    entry(Icon::CreditCard, "Pagamentos", "/dashboard/payments"),
    entry(Icon::BarChart, "Relatórios", "/dashboard/reports"),
    entry(Icon::Settings, "Configurações", "/dashboard/settings"),
];

const ADMIN_MENU: &[MenuEntry] = &[
    HOME,
    entry(Icon::Users, "Usuários", "/dashboard/users"),
    entry(Icon::Tractor, "Equipamentos", "/dashboard/equipment"),
    entry(Icon::Package, "Estoque", "/dashboard/inventory"),
    entry(Icon::CalendarRange, "Locações", "/dashboard/rentals"),
    entry(Icon::Wrench, "Intervenções", "/dashboard/interventions"),
    entry(Icon::CreditCard, "Pagamentos", "/dashboard/payments"),
    entry(Icon::Wallet, "Créditos", "/dashboard/credits"),
    entry(Icon::BarChart, "Relatórios", "/dashboard/reports"),
    PROFILE,
];

const STOCK_MANAGER_MENU: &[MenuEntry] = &[
    HOME,
    entry(Icon::Tractor, "Equipamentos", "/dashboard/equipment"),
    entry(Icon::Package, "Estoque", "/dashboard/inventory"),
    entry(Icon::CalendarRange, "Locações", "/dashboard/rentals"),
    entry(Icon::Wrench, "Intervenções", "/dashboard/interventions"),
    PROFILE,
];

const TECHNICIAN_MENU: &[MenuEntry] = &[
    HOME,
    entry(Icon::Wrench, "Intervenções", "/dashboard/interventions"),
    entry(Icon::ClipboardCheck, "Manutenção", "/dashboard/maintenance"),
    PROFILE,
];

const ACCOUNTANT_MENU: &[MenuEntry] = &[
    HOME,
    entry(Icon::CreditCard, "Pagamentos", "/dashboard/payments"),
    entry(Icon::FileText, "Faturas", "/dashboard/invoices"),
    entry(Icon::Wallet, "Créditos", "/dashboard/credits"),
    entry(Icon::CalendarRange, "Locações", "/dashboard/rentals"),
    entry(Icon::BarChart, "Relatórios", "/dashboard/reports"),
    PROFILE,
];

const CLIENT_MENU: &[MenuEntry] = &[
    HOME,
    entry(Icon::ShoppingCart, "Catálogo", "/dashboard/catalog"),
    entry(Icon::CalendarCheck, "Reservas", "/dashboard/bookings"),
    entry(Icon::CalendarRange, "Minhas locações", "/dashboard/my-rentals"),
    entry(Icon::MapPin, "Propriedades", "/dashboard/properties"),
    entry(Icon::Wheat, "Colheitas", "/dashboard/harvests"),
    entry(Icon::CreditCard, "Meus pagamentos", "/dashboard/my-payments"),
    PROFILE,
];

/// Papel usado pelo shell quando o perfil não traz papel.
pub const BASELINE_ROLE: Role = Role::Client;

/// Tabela imutável papel -> menu.
pub fn entries_for(role: Role) -> &'static [MenuEntry] {
    match role {
        Role::SuperAdmin => SUPER_ADMIN_MENU,
        Role::Admin => ADMIN_MENU,
        Role::StockManager => STOCK_MANAGER_MENU,
        Role::Technician => TECHNICIAN_MENU,
        Role::Accountant => ACCOUNTANT_MENU,
        Role::Client | Role::Cooperative | Role::Provider => CLIENT_MENU,
    }
}

/// Item já pronto para renderização, com o destaque da rota atual.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub icon: Icon,
    #[schema(example = "Equipamentos")]
    pub label: String,
    #[schema(example = "/dashboard/equipment")]
    pub path: String,
    pub active: bool,
}

/// Seleciona o menu do papel (ou do papel base) e marca a entrada da rota atual.
pub fn menu_for(role: Option<Role>, current_path: &str) -> Vec<MenuItem> {
    entries_for(role.unwrap_or(BASELINE_ROLE))
        .iter()
        .map(|e| MenuItem {
            icon: e.icon,
            label: e.label.to_string(),
            path: e.path.to_string(),
            active: e.path == current_path,
        })
        .collect()
}

#[cfg(test)]
#[path = "menu_test.rs"]
mod tests;
