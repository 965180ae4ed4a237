// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Estrutura de dados ("claims") dentro do JWT emitido pelo provedor de identidade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // Subject (ID do usuário)
    #[serde(default)]
    pub email: Option<String>,
    // Organizações (Fondos) que o usuário pode acessar
    #[serde(default)]
    pub organizations: Vec<Uuid>,
    // Slugs das permissões concedidas ("archive:write", ...)
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

impl Claims {
    pub fn can_access(&self, organization_id: Uuid) -> bool {
        self.organizations.contains(&organization_id)
    }

    pub fn has_permission(&self, slug: &str) -> bool {
        self.permissions.iter().any(|p| p == slug)
    }
}

// Resposta do /api/me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    #[schema(example = "archivista@empresa.co")]
    pub email: Option<String>,
    pub organizations: Vec<Uuid>,
    #[schema(example = json!(["archive:write"]))]
    pub permissions: Vec<String>,
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
            organizations: claims.organizations.clone(),
            permissions: claims.permissions.clone(),
        }
    }
}

// Permissão declarada no código (listada em /api/permissions)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[schema(example = "archive:write")]
    pub slug: String,
    #[schema(example = "ARCHIVE")]
    pub module: String,
    #[schema(example = "Crear y editar inventario, períodos y dependencias")]
    pub description: String,
}
