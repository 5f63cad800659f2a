//! Roles and the permission table that gates every resource endpoint.

text_enum! {
    /// System role of a user (`rol_sistema`).
    pub enum Rol {
        Administrador => "administrador",
        Vendedor => "vendedor",
        Almacenero => "almacenero",
        Auditor => "auditor",
    }
}

text_enum! {
    pub enum Permission {
        CreateProduct => "create_product",
        ReadProduct => "read_product",
        UpdateProduct => "update_product",
        DeleteProduct => "delete_product",
        CreateSale => "create_sale",
        ReadSale => "read_sale",
        UpdateSale => "update_sale",
        DeleteSale => "delete_sale",
        CreateInventory => "create_inventory",
        ReadInventory => "read_inventory",
        UpdateInventory => "update_inventory",
        DeleteInventory => "delete_inventory",
        CreateUser => "create_user",
        ReadUser => "read_user",
        UpdateUser => "update_user",
        DeleteUser => "delete_user",
        ReadAudit => "read_audit",
    }
}

impl Rol {
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;

        match self {
            Rol::Administrador => Permission::ALL,
            Rol::Vendedor => &[ReadProduct, CreateSale, ReadSale, UpdateSale],
            Rol::Almacenero => &[
                CreateProduct,
                ReadProduct,
                UpdateProduct,
                CreateInventory,
                ReadInventory,
                UpdateInventory,
            ],
            Rol::Auditor => &[ReadProduct, ReadSale, ReadInventory, ReadUser, ReadAudit],
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn can_all(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.can(*p))
    }

    pub fn can_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.can(*p))
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Rol::Administrador)
    }
}
